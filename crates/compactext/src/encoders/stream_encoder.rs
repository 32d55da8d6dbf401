//! # Stream Encoder
//!
//! Turns segmented text into an [`EncodedStream`] against a vocabulary.

use crate::encoders::encoded_stream::EncodedStream;
use crate::errors::{CompactError, Result};
use crate::segmentation::{SegmentedText, split_spans};
use crate::types::{NO_TOKEN, TokenId};
use crate::vocab::{LocalVocab, MergeOrder, Vocabulary, merge_rank_ordered};

/// Start a stream for `text`, pushing the lead record if it has one.
fn begin_stream(text: &SegmentedText<'_>) -> EncodedStream {
    let mut stream = EncodedStream::with_capacity(text.len() + 1);
    if !text.leading.is_empty() {
        stream.push(NO_TOKEN, text.leading);
    }
    stream
}

/// Encode every span of `text` by looking its token up in `vocab`.
///
/// # Errors
/// [`CompactError::UnknownToken`] if a token is missing from `vocab`.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(text, vocab)))]
pub fn encode_segmented(
    text: &SegmentedText<'_>,
    vocab: &Vocabulary,
) -> Result<EncodedStream> {
    let mut stream = begin_stream(text);
    for span in &text.spans {
        stream.push(vocab.try_lookup_token(span.token)?, span.separator);
    }
    Ok(stream)
}

/// Pair position-ordered ids with the separators of `text`.
///
/// `ids[p]` is the id of the token at position `p`.
///
/// # Errors
/// [`CompactError::Corrupt`] if `ids` and `text` disagree on the token count.
pub fn assemble_stream(
    text: &SegmentedText<'_>,
    ids: &[TokenId],
) -> Result<EncodedStream> {
    if ids.len() != text.len() {
        return Err(CompactError::Corrupt(format!(
            "{} ids for {} tokens",
            ids.len(),
            text.len()
        )));
    }
    let mut stream = begin_stream(text);
    for (&id, span) in ids.iter().zip(&text.spans) {
        stream.push(id, span.separator);
    }
    Ok(stream)
}

/// Encode one buffer with a vocabulary built from that buffer alone.
pub fn encode_bytes(buf: &[u8]) -> Result<(Vocabulary, EncodedStream)> {
    let text = split_spans(buf);
    let local: LocalVocab = text.tokens().collect();
    let vocab = merge_rank_ordered([local], MergeOrder::FirstSeen);
    let stream = encode_segmented(&text, &vocab)?;
    Ok((vocab, stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::encoded_stream::StreamRecord;

    #[test]
    fn test_encode_scenario() {
        let (vocab, stream) = encode_bytes(b"foo bar\nfoo  baz").unwrap();

        assert_eq!(vocab.lookup_token(b"foo"), Some(1));
        assert_eq!(vocab.lookup_token(b"bar"), Some(2));
        assert_eq!(vocab.lookup_token(b"baz"), Some(3));
        assert_eq!(vocab.len(), 3);

        assert_eq!(
            stream.records,
            vec![
                StreamRecord::new(1, " "),
                StreamRecord::new(2, "\n"),
                StreamRecord::new(1, "  "),
                StreamRecord::new(3, ""),
            ]
        );
    }

    #[test]
    fn test_encode_empty() {
        let (vocab, stream) = encode_bytes(b"").unwrap();
        assert!(vocab.is_empty());
        assert!(stream.is_empty());
    }

    #[test]
    fn test_encode_segmented_lead_record() {
        let text = split_spans(b"\t a b");
        let mut vocab = Vocabulary::new();
        vocab.insert(b"b");
        vocab.insert(b"a");

        let stream = encode_segmented(&text, &vocab).unwrap();
        assert_eq!(
            stream.records,
            vec![
                StreamRecord::new(NO_TOKEN, "\t "),
                StreamRecord::new(2, " "),
                StreamRecord::new(1, ""),
            ]
        );

        let missing = Vocabulary::new();
        assert!(matches!(
            encode_segmented(&text, &missing),
            Err(CompactError::UnknownToken(_))
        ));
    }

    #[test]
    fn test_assemble_stream_length_mismatch() {
        let text = split_spans(b"a b c");
        assert!(matches!(
            assemble_stream(&text, &[1, 2]),
            Err(CompactError::Corrupt(_))
        ));
        let stream = assemble_stream(&text, &[3, 1, 2]).unwrap();
        assert_eq!(stream.token_ids(), vec![3, 1, 2]);
    }
}
