//! # Artifact IO

pub mod artifacts;
pub mod binary_codec;

pub use artifacts::{ArtifactLayout, ArtifactPaths, DecodeTarget, stem_of};
pub use binary_codec::{
    StreamReader, load_stream_path, load_token_table_path, open_stream_path, read_stream,
    read_token_table, read_vocabulary, save_stream_path, save_vocabulary_path, write_stream,
    write_vocabulary,
};
