//! # compactext
//!
//! Dictionary word encoding: every distinct whitespace-delimited token of a
//! text is replaced by a dense `u32` id, and the whitespace that followed it
//! is kept verbatim, so decoding reproduces the source byte-for-byte.
//!
//! Work can be split across concurrent workers (threads, or ranks of a
//! message-passing world). Each worker builds a private vocabulary; the
//! coordinator merges them in rank order into one canonical vocabulary and
//! broadcasts it back, and positions tracked through every stage restore the
//! original token order.
//!
//! # Encoding Example
//!
//! ```rust,ignore
//! let options = EncodeOptions::default()
//!     .with_strategy(Strategy::Distributed { workers: 4 })
//!     .with_sharding(Sharding::ByPosition);
//!
//! let report = encode_files(&["docs/a.txt", "docs/b.txt"], &options)?;
//!
//! // docs/a_vocab.bin + docs/a_texto.bin, docs/b_vocab.bin + docs/b_texto.bin
//! decode_files(&["docs/a", "docs/b"], &DecodeOptions::default())?;
//! ```
#![warn(missing_docs, unused)]

pub mod collective;
pub mod decoders;
pub mod encoders;
pub mod engine;
pub mod errors;
pub mod io;
pub mod protocol;
pub mod segmentation;
pub mod types;
pub mod vocab;

pub use decoders::SeparatorMode;
pub use engine::{
    BuildMode, DecodeOptions, DecodeReport, EncodeOptions, EncodeReport, FileReport, FileStatus,
    Sharding, Strategy, decode_files, encode_files,
};
pub use io::ArtifactLayout;
pub use vocab::MergeOrder;
pub use errors::{CompactError, Result};

/// Default value for parallel processing; based on the `rayon` feature.
#[cfg(feature = "rayon")]
pub const DEFAULT_PARALLEL: bool = true;
/// Default value for parallel processing; based on the `rayon` feature.
#[cfg(not(feature = "rayon"))]
pub const DEFAULT_PARALLEL: bool = false;

/// Constant guess for the expected bytes/token ratio of prose.
pub const BYTES_PER_TOKEN_HINT: f64 = 6.0;
