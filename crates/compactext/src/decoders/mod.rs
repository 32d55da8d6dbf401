//! # Stream Decoders

pub mod reconstructor;

pub use reconstructor::{Reconstructor, SeparatorMode};
