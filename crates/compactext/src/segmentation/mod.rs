//! # Text Segmentation
//!
//! Byte-level splitting of a buffer into `(token, separator)` spans.

pub mod text_segmentor;

pub use text_segmentor::{SegmentedText, SpanRef, is_separator_byte, split_spans};
