//! # Stream Reconstructor

use crate::encoders::{EncodedStream, StreamRecord};
use crate::errors::{CompactError, Result};
use crate::types::NO_TOKEN;
use crate::vocab::TokenTable;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// How separators are emitted on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorMode {
    /// Every separator verbatim; the output equals the source.
    #[default]
    Preserve,

    /// Tokens joined by one ASCII space; stored separators and leading
    /// whitespace are dropped.
    SingleSpace,
}

/// Replays encoded records against a loaded [`TokenTable`].
#[derive(Debug, Clone)]
pub struct Reconstructor {
    table: TokenTable,
    mode: SeparatorMode,
}

impl Reconstructor {
    /// Create a reconstructor.
    pub fn new(
        table: TokenTable,
        mode: SeparatorMode,
    ) -> Self {
        Self { table, mode }
    }

    /// The token table.
    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    /// The separator mode.
    pub fn mode(&self) -> SeparatorMode {
        self.mode
    }

    /// Write the text of `records` to `out`.
    ///
    /// # Returns
    /// The number of tokens written.
    ///
    /// # Errors
    /// [`CompactError::IdOutOfRange`] on an id past the table;
    /// [`CompactError::Corrupt`] on a [`NO_TOKEN`] record anywhere but first;
    /// any error yielded by `records`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, records, out)))]
    pub fn reconstruct_to<I, W>(
        &self,
        records: I,
        out: &mut W,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Result<StreamRecord>>,
        W: Write,
    {
        let mut tokens = 0;
        for (idx, record) in records.into_iter().enumerate() {
            let record = record?;
            if record.id == NO_TOKEN {
                if idx != 0 {
                    return Err(CompactError::Corrupt(format!(
                        "reserved id {NO_TOKEN} at record {idx}"
                    )));
                }
                if self.mode == SeparatorMode::Preserve {
                    out.write_all(&record.separator)?;
                }
                continue;
            }

            let word = self.table.word(record.id)?;
            match self.mode {
                SeparatorMode::Preserve => {
                    out.write_all(word)?;
                    out.write_all(&record.separator)?;
                }
                SeparatorMode::SingleSpace => {
                    if tokens > 0 {
                        out.write_all(b" ")?;
                    }
                    out.write_all(word)?;
                }
            }
            tokens += 1;
        }
        Ok(tokens)
    }

    /// Reconstruct an in-memory stream.
    pub fn reconstruct(
        &self,
        stream: &EncodedStream,
    ) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reconstruct_to(stream.iter().cloned().map(Ok), &mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::encode_bytes;
    use crate::io::binary_codec::{StreamReader, write_stream};
    use crate::types::check_is_send;

    fn round_trip(src: &[u8]) -> Vec<u8> {
        let (vocab, stream) = encode_bytes(src).unwrap();
        Reconstructor::new(vocab.to_token_table(), SeparatorMode::Preserve)
            .reconstruct(&stream)
            .unwrap()
    }

    #[test]
    fn test_round_trip() {
        for src in [
            &b"foo bar\nfoo  baz"[..],
            b"",
            b"   ",
            b"\r\n\tindented\r\nlines \x0b\x0c end\n\n",
            "ünïcödé wörds\u{3000}stay".as_bytes(),
            b"\xff\xfe raw \x00 bytes",
        ] {
            assert_eq!(round_trip(src), src);
        }
    }

    #[test]
    fn test_single_space() {
        let (vocab, stream) = encode_bytes(b"  foo\tbar\n\nfoo  ").unwrap();
        let decoder = Reconstructor::new(vocab.to_token_table(), SeparatorMode::SingleSpace);
        assert_eq!(decoder.mode(), SeparatorMode::SingleSpace);
        assert_eq!(decoder.reconstruct(&stream).unwrap(), b"foo bar foo");
    }

    #[test]
    fn test_id_out_of_range() {
        let (vocab, _) = encode_bytes(b"a b c").unwrap();
        let decoder = Reconstructor::new(vocab.to_token_table(), SeparatorMode::Preserve);
        check_is_send(&decoder);

        let stream = EncodedStream::from(vec![StreamRecord::new(1, " "), StreamRecord::new(4, "")]);
        assert!(matches!(
            decoder.reconstruct(&stream),
            Err(CompactError::IdOutOfRange {
                id: 4,
                vocab_size: 3
            })
        ));
    }

    #[test]
    fn test_reserved_id_only_leads() {
        let (vocab, _) = encode_bytes(b"a b").unwrap();
        let decoder = Reconstructor::new(vocab.to_token_table(), SeparatorMode::Preserve);

        let stream = EncodedStream::from(vec![
            StreamRecord::new(NO_TOKEN, "\t"),
            StreamRecord::new(1, " "),
            StreamRecord::new(2, ""),
        ]);
        assert_eq!(decoder.reconstruct(&stream).unwrap(), b"\ta b");

        for mode in [SeparatorMode::Preserve, SeparatorMode::SingleSpace] {
            let decoder = Reconstructor::new(vocab.to_token_table(), mode);
            let stream = EncodedStream::from(vec![
                StreamRecord::new(1, " "),
                StreamRecord::new(NO_TOKEN, " "),
                StreamRecord::new(2, ""),
            ]);
            assert!(matches!(
                decoder.reconstruct(&stream),
                Err(CompactError::Corrupt(_))
            ));
        }
    }

    #[test]
    fn test_streaming_reader() {
        let src = b"streamed record by record";
        let (vocab, stream) = encode_bytes(src).unwrap();
        let mut bytes = Vec::new();
        write_stream(&stream, &mut bytes).unwrap();

        let decoder = Reconstructor::new(vocab.to_token_table(), SeparatorMode::Preserve);
        let mut out = Vec::new();
        let tokens = decoder
            .reconstruct_to(StreamReader::new(bytes.as_slice()).unwrap(), &mut out)
            .unwrap();
        assert_eq!(tokens, 4);
        assert_eq!(out, src);
    }
}
