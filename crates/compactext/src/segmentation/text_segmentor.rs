//! # Whitespace Text Segmentor

use crate::types::Position;

/// Returns true for the bytes C's `isspace` accepts in the "C" locale.
///
/// Space, `\t`, `\n`, `\v`, `\f` and `\r`. Every other byte, including all
/// bytes of multi-byte UTF-8 sequences, is token material.
#[inline]
pub fn is_separator_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// A token and the whitespace run that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpanRef<'a> {
    /// Maximal run of non-whitespace bytes; never empty.
    pub token: &'a [u8],

    /// Maximal run of whitespace after the token; may be empty.
    pub separator: &'a [u8],
}

/// The result of segmenting one buffer.
///
/// Concatenating `leading` and every `token + separator` in order gives back
/// the original buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentedText<'a> {
    /// Whitespace before the first token; empty unless the buffer starts with
    /// whitespace.
    pub leading: &'a [u8],

    /// Spans in scan order; the index of a span is its [`Position`].
    pub spans: Vec<SpanRef<'a>>,
}

impl<'a> SegmentedText<'a> {
    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when the buffer held no tokens.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Tokens in scan order.
    pub fn tokens(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.spans.iter().map(|s| s.token)
    }

    /// Separators in scan order; same length as [`Self::tokens`].
    pub fn separators(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.spans.iter().map(|s| s.separator)
    }

    /// The spans at `rank, rank + stride, rank + 2 * stride, ...`.
    ///
    /// Yields each span with its original position.
    pub fn strided(
        &self,
        rank: usize,
        stride: usize,
    ) -> impl Iterator<Item = (Position, &SpanRef<'a>)> + '_ {
        self.spans
            .iter()
            .enumerate()
            .skip(rank)
            .step_by(stride.max(1))
    }

    /// Reassembles the original bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            self.leading.len()
                + self
                    .spans
                    .iter()
                    .map(|s| s.token.len() + s.separator.len())
                    .sum::<usize>(),
        );
        buf.extend_from_slice(self.leading);
        for span in &self.spans {
            buf.extend_from_slice(span.token);
            buf.extend_from_slice(span.separator);
        }
        buf
    }
}

/// Length of the run at the start of `buf` whose bytes all satisfy `pred`.
fn run_len(
    buf: &[u8],
    pred: impl Fn(u8) -> bool,
) -> usize {
    buf.iter().position(|&b| !pred(b)).unwrap_or(buf.len())
}

/// Split a buffer into `(token, separator)` spans in one left-to-right scan.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(buf)))]
pub fn split_spans(buf: &[u8]) -> SegmentedText<'_> {
    let lead = run_len(buf, is_separator_byte);
    let (leading, mut rest) = buf.split_at(lead);

    let mut spans = Vec::with_capacity((buf.len() as f64 / crate::BYTES_PER_TOKEN_HINT) as usize);
    while !rest.is_empty() {
        let t = run_len(rest, |b| !is_separator_byte(b));
        let s = run_len(&rest[t..], is_separator_byte);
        spans.push(SpanRef {
            token: &rest[..t],
            separator: &rest[t..t + s],
        });
        rest = &rest[t + s..];
    }

    SegmentedText { leading, spans }
}
