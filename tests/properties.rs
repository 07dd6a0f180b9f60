//! Property tests for chunking, similarity and ranking

use proptest::prelude::*;
use resume_analyzer::config::ChunkingMode;
use resume_analyzer::processing::chunker::TextChunker;
use resume_analyzer::processing::search::cosine_similarity;
use resume_analyzer::processing::tokenizer::Tokenizer;
use resume_analyzer::TfIdfIndex;
use std::collections::HashSet;

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,9}[.!?]?", 0..400).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn prop_chunking_is_deterministic(text in words(), target in 60usize..800, overlap in 0usize..300) {
        let chunker = TextChunker::new(target, overlap % target).unwrap();
        prop_assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn prop_chunks_never_exceed_target(text in words(), target in 60usize..800, overlap in 0usize..300) {
        let chunker = TextChunker::new(target, overlap % target).unwrap();
        for chunk in chunker.chunk(&text) {
            prop_assert!(chunk.len() <= target);
            prop_assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn prop_window_chunks_cover_text(text in words(), target in 100usize..600, overlap in 0usize..100) {
        let chunker = TextChunker::new(target, overlap)
            .unwrap()
            .with_min_chunk_length(0);
        let chunks = chunker.chunk(&text);
        let total = text.chars().count();

        if text.trim().is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            let spans: Vec<(usize, usize)> = chunks.iter().filter_map(|c| c.span).collect();
            prop_assert_eq!(spans.len(), chunks.len());
            prop_assert_eq!(spans[0].0, 0);
            prop_assert_eq!(spans[spans.len() - 1].1, total);
            for pair in spans.windows(2) {
                // Consecutive windows touch or overlap, so no text is skipped.
                prop_assert!(pair[1].0 <= pair[0].1);
                prop_assert!(pair[1].0 > pair[0].0);
            }
        }
    }

    #[test]
    fn prop_sentence_chunks_never_exceed_target(text in words(), target in 60usize..800, overlap in 0usize..300) {
        let chunker = TextChunker::new(target, overlap % target)
            .unwrap()
            .with_mode(ChunkingMode::Sentence);
        for chunk in chunker.chunk(&text) {
            prop_assert!(chunk.len() <= target);
            prop_assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn prop_sentence_chunks_keep_every_word(text in words(), target in 60usize..600, overlap in 0usize..200) {
        let chunker = TextChunker::new(target, overlap % target)
            .unwrap()
            .with_mode(ChunkingMode::Sentence)
            .with_min_chunk_length(0);
        let chunks = chunker.chunk(&text);

        let kept: HashSet<&str> = chunks.iter().flat_map(|c| c.content.split_whitespace()).collect();
        for word in text.split_whitespace() {
            prop_assert!(kept.contains(word), "lost {:?}", word);
        }
        prop_assert_eq!(chunks.is_empty(), text.trim().is_empty());
    }

    #[test]
    fn prop_cosine_is_bounded(
        pairs in prop::collection::vec((-1.0e3f64..1.0e3, -1.0e3f64..1.0e3), 0..32)
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let score = cosine_similarity(&a, &b);
        prop_assert!((-1.0..=1.0).contains(&score));
        prop_assert!((score - cosine_similarity(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn prop_search_is_ranked_and_bounded(
        chunks in prop::collection::vec("[a-e]{3,5}( [a-e]{3,5}){0,12}", 0..20),
        query in "[a-e]{3,5}( [a-e]{3,5}){0,4}",
        k in 0usize..25,
    ) {
        let index = TfIdfIndex::build(&chunks, Tokenizer::default());
        let hits = index.search(&query, k);

        prop_assert_eq!(hits.len(), k.min(chunks.len()));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].position < pair[1].position);
            }
        }
        for hit in &hits {
            prop_assert_eq!(&hit.content, &chunks[hit.position]);
        }
    }

    #[test]
    fn prop_unknown_query_terms_are_ignored(
        chunks in prop::collection::vec("[a-e]{3,5}( [a-e]{3,5}){0,12}", 1..10),
    ) {
        let index = TfIdfIndex::build(&chunks, Tokenizer::default());
        let vector = index.vectorize("zzzz qqqq");
        prop_assert_eq!(vector.len(), index.vocabulary().len());
        prop_assert!(vector.iter().all(|w| *w == 0.0));
    }
}
