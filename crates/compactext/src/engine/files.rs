//! # Run Inputs and Artifacts

use crate::encoders::{EncodedStream, encode_segmented};
use crate::engine::EncodeOptions;
use crate::errors::{CompactError, Result};
use crate::io::{ArtifactLayout, save_stream_path, save_vocabulary_path};
use crate::segmentation::{SegmentedText, split_spans};
use crate::vocab::Vocabulary;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Outcome of one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    /// Artifacts written.
    Encoded,

    /// The input could not be read; nothing written.
    Missing,
}

/// Per-input entry of an [`crate::engine::EncodeReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The input path.
    pub input: PathBuf,

    /// What happened to it.
    pub status: FileStatus,

    /// The vocabulary written for it.
    pub vocab: Option<PathBuf>,

    /// The stream written for it.
    pub stream: Option<PathBuf>,

    /// Tokens encoded.
    pub tokens: usize,

    /// Source size in bytes.
    pub bytes: usize,

    /// Why the input was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Report for a skipped input.
    pub fn missing(
        input: &Path,
        err: Option<&CompactError>,
    ) -> Self {
        Self {
            input: input.to_path_buf(),
            status: FileStatus::Missing,
            vocab: None,
            stream: None,
            tokens: 0,
            bytes: 0,
            error: err.map(ToString::to_string),
        }
    }
}

/// Read a source file.
///
/// # Errors
/// [`CompactError::InputNotFound`] on any open or read failure.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| CompactError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// An input, loaded or found unreadable.
#[derive(Debug)]
pub struct Source {
    /// The input path.
    pub path: PathBuf,

    /// Its bytes.
    pub data: Result<Vec<u8>>,
}

impl Source {
    /// Wrap bytes loaded elsewhere.
    pub fn new(
        path: &Path,
        data: Result<Vec<u8>>,
    ) -> Self {
        if let Err(err) = &data {
            log::warn!("skipping input: {err}");
        }
        Self {
            path: path.to_path_buf(),
            data,
        }
    }

    /// Read `path`.
    pub fn load(path: &Path) -> Self {
        Self::new(path, read_input(path))
    }

    /// Segment the bytes, if any.
    pub fn segment(&self) -> Option<SegmentedText<'_>> {
        self.data.as_ref().ok().map(|data| split_spans(data))
    }

    /// Report for this input, which was not encoded.
    pub fn missing_report(&self) -> FileReport {
        FileReport::missing(&self.path, self.data.as_ref().err())
    }
}

/// Remove an artifact left by an earlier run, if any.
fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Check that no two inputs share an encoded stream path.
///
/// # Errors
/// [`CompactError::InvalidConfig`] naming both inputs.
pub fn check_distinct_stems(
    inputs: &[PathBuf],
    options: &EncodeOptions,
) -> Result<()> {
    let mut seen: ahash::AHashMap<PathBuf, &Path> = Default::default();
    for input in inputs {
        let stream = options.artifact_paths(input).stream;
        if let Some(prev) = seen.insert(stream.clone(), input) {
            return Err(CompactError::InvalidConfig(format!(
                "{} and {} both encode to {}",
                prev.display(),
                input.display(),
                stream.display()
            )));
        }
    }
    Ok(())
}

/// Write the stream of one input, plus its vocabulary in the per-file
/// layout.
pub fn write_encoded(
    source: &Source,
    text: &SegmentedText<'_>,
    stream: &EncodedStream,
    vocab: &Vocabulary,
    options: &EncodeOptions,
) -> Result<FileReport> {
    let paths = options.artifact_paths(&source.path);
    save_stream_path(stream, &paths.stream)?;
    match options.layout {
        ArtifactLayout::PerFile => save_vocabulary_path(vocab, &paths.vocab)?,
        // Decode prefers `<stem>_vocab.bin`; one left by an earlier run would
        // shadow the shared vocabulary.
        ArtifactLayout::RunWide => remove_stale(&paths.per_file_vocab())?,
    }
    log::debug!(
        "{} -> {} ({} tokens)",
        source.path.display(),
        paths.stream.display(),
        text.len()
    );

    Ok(FileReport {
        input: source.path.clone(),
        status: FileStatus::Encoded,
        vocab: Some(paths.vocab),
        stream: Some(paths.stream),
        tokens: text.len(),
        bytes: source.data.as_ref().map(Vec::len).unwrap_or(0),
        error: None,
    })
}

/// Encode one input against the run's vocabulary and write it.
///
/// # Returns
/// A [`FileStatus::Missing`] report when the input was not loaded.
pub fn encode_and_write(
    source: &Source,
    text: Option<&SegmentedText<'_>>,
    vocab: &Vocabulary,
    options: &EncodeOptions,
) -> Result<FileReport> {
    match text {
        Some(text) => {
            let stream = encode_segmented(text, vocab)?;
            write_encoded(source, text, &stream, vocab, options)
        }
        None => Ok(source.missing_report()),
    }
}

/// Write the shared `vocab.bin` once per distinct path.
///
/// # Returns
/// The number of files written.
pub fn write_run_wide_vocab<'a, I>(
    vocab: &Vocabulary,
    paths: I,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a Path>,
{
    let targets: BTreeSet<&Path> = paths.into_iter().collect();
    for path in &targets {
        save_vocabulary_path(vocab, path)?;
        log::debug!("wrote {}", path.display());
    }
    Ok(targets.len())
}

/// Write the shared vocabulary for every encoded report, in the run-wide
/// layout.
pub fn finish_run(
    vocab: &Vocabulary,
    files: &[FileReport],
    options: &EncodeOptions,
) -> Result<()> {
    if options.layout == ArtifactLayout::RunWide {
        write_run_wide_vocab(
            vocab,
            files
                .iter()
                .filter(|f| f.status == FileStatus::Encoded)
                .filter_map(|f| f.vocab.as_deref()),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_token_table_path;

    #[test]
    fn test_missing_source() {
        tempdir::TempDir::new("files_test")
            .and_then(|dir| {
                let source = Source::load(&dir.path().join("nope.txt"));
                assert!(matches!(
                    source.data,
                    Err(CompactError::InputNotFound { .. })
                ));
                assert!(source.segment().is_none());

                let report = source.missing_report();
                assert_eq!(report.status, FileStatus::Missing);
                assert!(report.error.unwrap().contains("nope.txt"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_shared_stems_are_rejected() {
        let options = EncodeOptions::default();
        let inputs = vec![PathBuf::from("x.txt"), PathBuf::from("x.md")];
        assert!(matches!(
            check_distinct_stems(&inputs, &options),
            Err(CompactError::InvalidConfig(_))
        ));

        let inputs = vec![PathBuf::from("a/x.txt"), PathBuf::from("b/x.txt")];
        assert!(check_distinct_stems(&inputs, &options).is_ok());
        assert!(matches!(
            check_distinct_stems(&inputs, &options.with_out_dir(Some("out"))),
            Err(CompactError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_run_wide_vocab_written_once_per_dir() {
        tempdir::TempDir::new("files_test")
            .and_then(|dir| {
                let mut vocab = Vocabulary::new();
                vocab.insert(b"x");

                let shared = dir.path().join("vocab.bin");
                let written =
                    write_run_wide_vocab(&vocab, [shared.as_path(), shared.as_path()]).unwrap();
                assert_eq!(written, 1);
                assert_eq!(load_token_table_path(&shared).unwrap().len(), 1);
                Ok(())
            })
            .unwrap();
    }
}
