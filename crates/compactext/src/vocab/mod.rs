//! # Vocabulary

pub mod canonical_vocab;
pub mod local_vocab;
pub mod locked_vocab;
pub mod merge;
pub mod token_table;

pub use canonical_vocab::Vocabulary;
pub use local_vocab::LocalVocab;
pub use locked_vocab::LockedVocabBuilder;
pub use merge::{MergeOrder, merge_rank_ordered};
pub use token_table::TokenTable;
