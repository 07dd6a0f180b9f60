//! Keyword-based feature extraction
//!
//! A secondary signal next to the vector space: a fixed taxonomy of skills,
//! experience markers, education markers and certifications is scanned for
//! in the raw text, and the most frequent terms are reported as generic
//! keywords. Nothing here is similarity-based.
//!
//! The taxonomy is data. Each [`CategoryRule`] lists literal names, matched
//! case-insensitively on word boundaries and reported by their canonical
//! spelling, and regular expressions whose matched text is reported.

use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::tokenizer::Tokenizer;
use aho_corasick::{AhoCorasick, MatchKind};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Number of generic keywords reported.
pub const MAX_KEYWORDS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    Skills,
    Experience,
    Education,
    Certifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: FeatureCategory,
    pub literals: Vec<String>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub keywords: Vec<String>,
}

impl ExtractedFeatures {
    pub fn get(&self, category: FeatureCategory) -> &[String] {
        match category {
            FeatureCategory::Skills => &self.skills,
            FeatureCategory::Experience => &self.experience,
            FeatureCategory::Education => &self.education,
            FeatureCategory::Certifications => &self.certifications,
        }
    }

    fn get_mut(&mut self, category: FeatureCategory) -> &mut Vec<String> {
        match category {
            FeatureCategory::Skills => &mut self.skills,
            FeatureCategory::Experience => &mut self.experience,
            FeatureCategory::Education => &mut self.education,
            FeatureCategory::Certifications => &mut self.certifications,
        }
    }
}

const SKILL_LITERALS: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "Rust", "Golang", "C++", "C#", "Ruby",
    "PHP", "Kotlin", "Scala", "SQL", "NoSQL", "HTML", "CSS", "React", "Angular", "Vue",
    "Node.js", "Django", "Flask", "Spring Boot", "Ruby on Rails", ".NET", "AWS", "Azure",
    "GCP", "Google Cloud", "Docker", "Kubernetes", "Terraform", "Jenkins", "Git", "Linux",
    "PostgreSQL", "MySQL", "MongoDB", "Redis", "GraphQL", "REST API", "RESTful",
    "Microservices", "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Pandas",
    "Spark", "Kafka", "Agile", "Scrum", "CI/CD",
];

const EXPERIENCE_PATTERNS: &[&str] = &[
    r"\b\d+\+?\s*(?:years?|yrs?)(?:\s+of)?(?:\s+(?:professional|industry|relevant|hands-on))?\s+experience\b",
    r"\b(?:senior|junior|lead|principal|staff|chief)\s+(?:(?:software|data|backend|frontend|full[\s-]?stack|devops|platform|cloud)\s+)?(?:engineer|developer|architect|analyst|scientist|manager|designer)\b",
    r"\b(?:software|data|backend|frontend|full[\s-]?stack|devops|machine learning)\s+(?:engineer|developer|scientist|analyst)\b",
    r"\b(?:tech(?:nical)? lead|team lead|engineering manager|product manager|project manager|internship|intern|consultant|freelancer?)\b",
];

const EDUCATION_PATTERNS: &[&str] = &[
    r"\b(?:bachelor|master|doctor)(?:'s)?(?:\s+(?:of|in)\s+[a-z]+)?(?:\s+(?:of|in)\s+[a-z]+)?",
    r"(?-i)\b(?:BSc|MSc|MBA|PhD|Ph\.D|B\.Tech|M\.Tech|B\.S|M\.S|B\.A|M\.A)\b",
    r"\b(?:university|college|institute|school)\s+of\s+[a-z]+(?:\s+[a-z]+)?",
    r"(?-i)\b[A-Z][a-z]+\s+(?:University|College|Institute of Technology)\b",
    r"\bGPA\s*:?\s*\d\.\d+",
    r"\b(?:high school\s+)?diploma\b",
];

const CERTIFICATION_LITERALS: &[&str] = &[
    "AWS Certified", "Certified Kubernetes Administrator", "CKA", "PMP", "CISSP", "CompTIA",
    "Security+", "Certified ScrumMaster", "Scrum Master", "Google Cloud Certified",
    "Azure Fundamentals", "Oracle Certified", "ITIL", "Six Sigma", "CFA", "CPA",
];

const CERTIFICATION_PATTERNS: &[&str] = &[
    r"\b(?:aws|azure|google cloud|gcp|oracle|microsoft|cisco|salesforce)\s+certified(?:\s+[a-z]+){0,3}\s+(?:professional|associate|administrator|developer|architect|specialist|expert|practitioner)\b",
    r"\bcertified\s+[a-z]+(?:\s+[a-z]+)?\s+(?:professional|associate|administrator|developer|architect|specialist|expert)\b",
    r"\bcertificat(?:e|ion)\s+in\s+[a-z]+(?:\s+[a-z]+)?",
];

/// The built-in taxonomy.
pub fn default_taxonomy() -> Vec<CategoryRule> {
    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    vec![
        CategoryRule {
            category: FeatureCategory::Skills,
            literals: owned(SKILL_LITERALS),
            patterns: Vec::new(),
        },
        CategoryRule {
            category: FeatureCategory::Experience,
            literals: Vec::new(),
            patterns: owned(EXPERIENCE_PATTERNS),
        },
        CategoryRule {
            category: FeatureCategory::Education,
            literals: Vec::new(),
            patterns: owned(EDUCATION_PATTERNS),
        },
        CategoryRule {
            category: FeatureCategory::Certifications,
            literals: owned(CERTIFICATION_LITERALS),
            patterns: owned(CERTIFICATION_PATTERNS),
        },
    ]
}

struct CompiledRule {
    category: FeatureCategory,
    literals: Vec<String>,
    literal_matcher: Option<AhoCorasick>,
    patterns: Vec<Regex>,
}

/// A match found in the text: byte range plus the value to report.
struct Found {
    start: usize,
    end: usize,
    value: String,
}

pub struct FeatureExtractor {
    rules: Vec<CompiledRule>,
    tokenizer: Tokenizer,
}

impl FeatureExtractor {
    pub fn new() -> Result<Self> {
        Self::with_taxonomy(default_taxonomy())
    }

    pub fn with_taxonomy(taxonomy: Vec<CategoryRule>) -> Result<Self> {
        let rules = taxonomy
            .into_iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            tokenizer: Tokenizer::default(),
        })
    }

    pub fn extract(&self, text: &str) -> ExtractedFeatures {
        let mut features = ExtractedFeatures::default();

        for rule in &self.rules {
            let values = rule.find_all(text);
            let target = features.get_mut(rule.category);
            let mut seen: HashSet<String> = target.iter().map(|v| v.to_lowercase()).collect();
            for value in values {
                if seen.insert(value.to_lowercase()) {
                    target.push(value);
                }
            }
        }

        features.keywords = self.top_keywords(text, MAX_KEYWORDS);
        features
    }

    /// Most frequent terms, ties broken by first occurrence.
    pub fn top_keywords(&self, text: &str, limit: usize) -> Vec<String> {
        let stream = self.tokenizer.tokenize(text);
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for term in stream.iter().filter(|t| t.chars().any(char::is_alphabetic)) {
            let count = counts.entry(term).or_insert(0);
            if *count == 0 {
                order.push(term);
            }
            *count += 1;
        }

        // Stable sort keeps first-occurrence order among equal counts.
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.into_iter().take(limit).map(str::to_string).collect()
    }
}

impl CompiledRule {
    fn find_all(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();

        if let Some(matcher) = &self.literal_matcher {
            for m in matcher.find_iter(text) {
                if on_word_boundary(text, m.start(), m.end()) {
                    found.push(Found {
                        start: m.start(),
                        end: m.end(),
                        value: self.literals[m.pattern().as_usize()].clone(),
                    });
                }
            }
        }

        for pattern in &self.patterns {
            for m in pattern.find_iter(text) {
                let value = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
                if !value.is_empty() {
                    found.push(Found {
                        start: m.start(),
                        end: m.end(),
                        value,
                    });
                }
            }
        }

        // Earliest first; at one position the longest match wins, and any
        // match nested inside an earlier one is dropped.
        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut covered_until = 0;
        let mut values = Vec::new();
        for f in found {
            if f.end <= covered_until {
                continue;
            }
            covered_until = covered_until.max(f.end);
            values.push(f.value);
        }
        values
    }
}

fn compile_rule(rule: CategoryRule) -> Result<CompiledRule> {
    let literal_matcher = if rule.literals.is_empty() {
        None
    } else {
        Some(
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .match_kind(MatchKind::LeftmostLongest)
                .build(&rule.literals)
                .map_err(|e| {
                    ResumeAnalyzerError::InvalidConfiguration(format!(
                        "Failed to build {:?} matcher: {}",
                        rule.category, e
                    ))
                })?,
        )
    };

    let patterns = rule
        .patterns
        .iter()
        .map(|source| {
            RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ResumeAnalyzerError::InvalidConfiguration(format!(
                        "Invalid {:?} pattern {:?}: {}",
                        rule.category, source, e
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledRule {
        category: rule.category,
        literals: rule.literals,
        literal_matcher,
        patterns,
    })
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Extract features with the built-in taxonomy.
pub fn extract_features(text: &str) -> ExtractedFeatures {
    static DEFAULT: OnceLock<FeatureExtractor> = OnceLock::new();
    DEFAULT
        .get_or_init(|| FeatureExtractor::new().expect("Invalid built-in feature taxonomy"))
        .extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\n\
        Senior Software Engineer with 7+ years of experience building Node.js and Python services on AWS.\n\
        Skills: JavaScript, TypeScript, React, Docker, Kubernetes, C++, CI/CD\n\
        Education: Bachelor of Science in Computer Science, Stanford University, GPA: 3.8\n\
        Certifications: AWS Certified Solutions Architect Associate, PMP";

    #[test]
    fn test_skills_use_canonical_names() {
        let features = extract_features(RESUME);

        for skill in ["Node.js", "Python", "AWS", "JavaScript", "TypeScript", "React", "Docker", "Kubernetes", "C++", "CI/CD"] {
            assert!(features.skills.contains(&skill.to_string()), "missing {}", skill);
        }
        // "Java" only occurs inside "JavaScript".
        assert!(!features.skills.contains(&"Java".to_string()));
    }

    #[test]
    fn test_experience_markers() {
        let features = extract_features(RESUME);

        assert!(features.experience.contains(&"7+ years of experience".to_string()));
        assert!(features.experience.contains(&"Senior Software Engineer".to_string()));
        // Nested "Software Engineer" is folded into the longer title.
        assert!(!features.experience.contains(&"Software Engineer".to_string()));
    }

    #[test]
    fn test_education_markers() {
        let features = extract_features(RESUME);

        assert!(features.education.contains(&"Bachelor of Science in Computer".to_string()));
        assert!(features.education.contains(&"Stanford University".to_string()));
        assert!(features.education.contains(&"GPA: 3.8".to_string()));
    }

    #[test]
    fn test_certification_markers() {
        let features = extract_features(RESUME);

        assert!(features
            .certifications
            .contains(&"AWS Certified Solutions Architect Associate".to_string()));
        assert!(features.certifications.contains(&"PMP".to_string()));
        assert!(!features.certifications.contains(&"AWS Certified".to_string()));
    }

    #[test]
    fn test_case_insensitive_and_deduplicated() {
        let features = extract_features("python, PYTHON and Python again; docker");
        assert_eq!(features.skills, vec!["Python".to_string(), "Docker".to_string()]);
    }

    #[test]
    fn test_literals_respect_word_boundaries() {
        let features = extract_features("Gitlab pipelines and legit sparkle");
        assert!(features.skills.is_empty());
    }

    #[test]
    fn test_keywords_by_frequency_then_first_occurrence() {
        let extractor = FeatureExtractor::new().unwrap();
        let keywords = extractor.top_keywords("beta alpha beta gamma alpha delta 2024 2024 2024", 3);

        assert_eq!(keywords, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_keywords_capped() {
        let text: String = (0..40).map(|i| format!("term{} ", (b'a' + (i % 26) as u8) as char)).collect();
        let features = extract_features(&text);

        assert_eq!(features.keywords.len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_features(""), ExtractedFeatures::default());
    }

    #[test]
    fn test_custom_taxonomy() {
        let mut taxonomy = default_taxonomy();
        taxonomy[0].literals.push("Elixir".to_string());

        let extractor = FeatureExtractor::with_taxonomy(taxonomy).unwrap();
        let features = extractor.extract("Phoenix apps written in elixir");
        assert_eq!(features.get(FeatureCategory::Skills), &["Elixir".to_string()]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let taxonomy = vec![CategoryRule {
            category: FeatureCategory::Education,
            literals: Vec::new(),
            patterns: vec!["(unclosed".to_string()],
        }];

        assert!(matches!(
            FeatureExtractor::with_taxonomy(taxonomy),
            Err(ResumeAnalyzerError::InvalidConfiguration(_))
        ));
    }
}
