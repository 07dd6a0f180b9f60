//! Text processing and retrieval module

pub mod chunker;
pub mod document;
pub mod features;
pub mod search;
pub mod tokenizer;
pub mod vector_space;
