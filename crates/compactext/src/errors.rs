//! # Errors

use crate::types::{Rank, TokenId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while encoding, decoding or coordinating workers.
#[derive(Error, Debug)]
pub enum CompactError {
    /// A source file is missing or unreadable.
    ///
    /// Recoverable: the unit of work contributes nothing and the run continues.
    #[error("input not found: {path}: {source}")]
    InputNotFound {
        /// The input path.
        path: PathBuf,
        /// The underlying open/read failure.
        #[source]
        source: std::io::Error,
    },

    /// The vocabulary paired with a stream could not be found at decode time.
    #[error("vocabulary missing: {0}")]
    VocabularyMissing(PathBuf),

    /// The encoded stream could not be found at decode time.
    #[error("encoded stream missing: {0}")]
    StreamMissing(PathBuf),

    /// A stream references an id the loaded vocabulary does not contain.
    #[error("token id {id} out of range for vocabulary of size {vocab_size}")]
    IdOutOfRange {
        /// The offending id.
        id: TokenId,
        /// The size of the loaded vocabulary.
        vocab_size: usize,
    },

    /// A collective operation could not complete on every rank.
    #[error("collective {op} failed at rank {rank}: {reason}")]
    CollectiveFailure {
        /// The collective that failed.
        op: &'static str,
        /// The rank observing the failure.
        rank: Rank,
        /// What went wrong.
        reason: String,
    },

    /// An artifact or wire blob is truncated or malformed.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// A token has no id in the vocabulary used for encoding.
    #[error("token {0:?} is not in the vocabulary")]
    UnknownToken(String),

    /// Options that cannot describe a valid run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompactError {
    /// Builds a [`CompactError::CollectiveFailure`].
    pub fn collective(
        op: &'static str,
        rank: Rank,
        reason: impl Into<String>,
    ) -> Self {
        Self::CollectiveFailure {
            op,
            rank,
            reason: reason.into(),
        }
    }

    /// Builds a [`CompactError::UnknownToken`] from raw token bytes.
    pub fn unknown_token(token: &[u8]) -> Self {
        Self::UnknownToken(String::from_utf8_lossy(token).to_string())
    }

    /// True for errors caused by a peer dropping out of a collective.
    pub fn is_collective(&self) -> bool {
        matches!(self, Self::CollectiveFailure { .. })
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, CompactError>;
