//! # Encoded Stream

use crate::types::{NO_TOKEN, TokenId};

/// One `(id, separator)` entry of an [`EncodedStream`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamRecord {
    /// The token id; [`NO_TOKEN`] for the lead record.
    pub id: TokenId,

    /// The whitespace that followed the token.
    pub separator: Vec<u8>,
}

impl StreamRecord {
    /// Create a record.
    pub fn new(
        id: TokenId,
        separator: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id,
            separator: separator.into(),
        }
    }

    /// True for the record carrying whitespace found before the first token.
    pub fn is_lead(&self) -> bool {
        self.id == NO_TOKEN
    }
}

/// The ordered `(id, separator)` sequence of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedStream {
    /// Records in document order.
    pub records: Vec<StreamRecord>,
}

impl EncodedStream {
    /// Create an empty stream with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// The number of records, including a lead record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the stream holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record.
    pub fn push(
        &mut self,
        id: TokenId,
        separator: &[u8],
    ) {
        self.records.push(StreamRecord::new(id, separator));
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, StreamRecord> {
        self.records.iter()
    }

    /// The token ids in order, lead record excluded.
    pub fn token_ids(&self) -> Vec<TokenId> {
        self.records
            .iter()
            .filter(|r| !r.is_lead())
            .map(|r| r.id)
            .collect()
    }

    /// The number of tokens, lead record excluded.
    pub fn token_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_lead()).count()
    }
}

impl From<Vec<StreamRecord>> for EncodedStream {
    fn from(records: Vec<StreamRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a EncodedStream {
    type Item = &'a StreamRecord;

    type IntoIter = std::slice::Iter<'a, StreamRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_record() {
        let mut stream = EncodedStream::with_capacity(3);
        stream.push(NO_TOKEN, b"  ");
        stream.push(1, b" ");
        stream.push(2, b"");

        assert_eq!(stream.len(), 3);
        assert_eq!(stream.token_count(), 2);
        assert_eq!(stream.token_ids(), vec![1, 2]);
        assert!(stream.records[0].is_lead());
        assert!(!stream.records[1].is_lead());
        assert_eq!((&stream).into_iter().count(), 3);
    }
}
