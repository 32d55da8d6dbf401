//! # Stream Encoders

pub mod encoded_stream;
pub mod stream_encoder;

pub use encoded_stream::{EncodedStream, StreamRecord};
pub use stream_encoder::{assemble_stream, encode_bytes, encode_segmented};
