//! # Common Types

/// A vocabulary token id.
///
/// Ids are dense and 1-based; see [`NO_TOKEN`].
pub type TokenId = u32;

/// The reserved id 0.
///
/// Never assigned to a word. In an encoded stream it marks the lead record
/// that carries whitespace found before the first token.
pub const NO_TOKEN: TokenId = 0;

/// The first id handed out by a vocabulary.
pub const FIRST_TOKEN: TokenId = 1;

/// Zero-based index of a token in the token sequence of a document.
pub type Position = usize;

/// Worker rank within a world.
pub type Rank = usize;

/// Byte word to [`TokenId`] map.
pub type WordToTokenMap = ahash::AHashMap<Vec<u8>, TokenId>;

/// Check if a type is `Send`.
#[cfg(test)]
pub(crate) fn check_is_send<S: Send>(_: S) {}

#[cfg(test)]
/// Check if a type is `Sync`.
pub(crate) fn check_is_sync<S: Sync>(_: S) {}
