//! # Id-Indexed Token Table

use crate::errors::{CompactError, Result};
use crate::types::{NO_TOKEN, TokenId};

/// Decode-side vocabulary: a flat array indexed directly by id.
///
/// Slot 0 is [`NO_TOKEN`] and stays empty; ids are contiguous in `1..=len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTable {
    slots: Vec<Vec<u8>>,
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::with_size(0)
    }
}

impl TokenTable {
    /// A table with `vocab_size` empty slots plus the reserved slot 0.
    pub fn with_size(vocab_size: usize) -> Self {
        Self {
            slots: vec![Vec::new(); vocab_size + 1],
        }
    }

    /// Build from words listed in id order (the first word gets id 1).
    pub fn from_ordered_words(words: Vec<Vec<u8>>) -> Self {
        let mut slots = Vec::with_capacity(words.len() + 1);
        slots.push(Vec::new());
        slots.extend(words);
        Self { slots }
    }

    /// The vocabulary size, V.
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// True for a vocabulary with no words.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the word of an id.
    ///
    /// # Errors
    /// [`CompactError::Corrupt`] if `id` is outside `1..=len`, already set,
    /// or `word` is empty.
    pub fn set(
        &mut self,
        id: TokenId,
        word: Vec<u8>,
    ) -> Result<()> {
        if word.is_empty() {
            return Err(CompactError::Corrupt(format!(
                "vocabulary id {id} has an empty token"
            )));
        }
        let vocab_size = self.len();
        match self.slots.get_mut(id as usize) {
            Some(slot) if id != NO_TOKEN && slot.is_empty() => {
                *slot = word;
                Ok(())
            }
            Some(_) if id != NO_TOKEN => Err(CompactError::Corrupt(format!(
                "duplicate vocabulary id {id}"
            ))),
            _ => Err(CompactError::Corrupt(format!(
                "vocabulary id {id} outside 1..={vocab_size}"
            ))),
        }
    }

    /// The word of an id.
    ///
    /// # Errors
    /// [`CompactError::IdOutOfRange`] if `id` is past the end of the table.
    #[inline]
    pub fn word(
        &self,
        id: TokenId,
    ) -> Result<&[u8]> {
        self.slots
            .get(id as usize)
            .map(Vec::as_slice)
            .ok_or(CompactError::IdOutOfRange {
                id,
                vocab_size: self.len(),
            })
    }

    /// Iterate `(id, word)` in id order, skipping slot 0.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &[u8])> {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .map(|(id, w)| (id as TokenId, w.as_slice()))
    }

    /// Release the words in id order, without slot 0.
    pub fn into_ordered_words(mut self) -> Vec<Vec<u8>> {
        self.slots.remove(0);
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        let mut table = TokenTable::with_size(2);
        assert_eq!(table.len(), 2);

        table.set(2, b"bar".to_vec()).unwrap();
        table.set(1, b"foo".to_vec()).unwrap();

        assert_eq!(table.word(1).unwrap(), b"foo");
        assert_eq!(table.word(2).unwrap(), b"bar");
        assert_eq!(table.word(0).unwrap(), b"");
        assert!(matches!(
            table.word(3),
            Err(CompactError::IdOutOfRange {
                id: 3,
                vocab_size: 2
            })
        ));

        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![(1, &b"foo"[..]), (2, &b"bar"[..])]
        );
    }

    #[test]
    fn test_set_rejects_bad_ids() {
        let mut table = TokenTable::with_size(1);
        assert!(matches!(
            table.set(0, b"x".to_vec()),
            Err(CompactError::Corrupt(_))
        ));
        assert!(matches!(
            table.set(2, b"x".to_vec()),
            Err(CompactError::Corrupt(_))
        ));
        assert!(matches!(
            table.set(1, Vec::new()),
            Err(CompactError::Corrupt(_))
        ));
        table.set(1, b"x".to_vec()).unwrap();
        assert!(matches!(
            table.set(1, b"y".to_vec()),
            Err(CompactError::Corrupt(_))
        ));
    }

    #[test]
    fn test_empty() {
        let table = TokenTable::default();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
        assert!(table.into_ordered_words().is_empty());
    }
}
