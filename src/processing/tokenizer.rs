//! Term normalization shared by indexing, querying and keyword extraction

/// Default: tokens of two characters or fewer are dropped.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 2;

/// Lowercases text, replaces anything that is not a letter, digit or
/// whitespace with a space, and splits on whitespace. No stemming and no
/// stop words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    min_token_length: usize,
}

/// Normalized text whose terms can be iterated any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    normalized: String,
    min_token_length: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
        }
    }
}

impl Tokenizer {
    /// Tokens whose length is `<= min_token_length` characters are dropped.
    pub fn new(min_token_length: usize) -> Self {
        Self { min_token_length }
    }

    pub fn min_token_length(&self) -> usize {
        self.min_token_length
    }

    pub fn tokenize(&self, text: &str) -> TokenStream {
        TokenStream {
            normalized: normalize(text),
            min_token_length: self.min_token_length,
        }
    }

    /// Owned terms, in order of appearance.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.tokenize(text).iter().map(str::to_string).collect()
    }
}

impl TokenStream {
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let min = self.min_token_length;
        self.normalized
            .split_whitespace()
            .filter(move |token| token.chars().count() > min)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect()
}
