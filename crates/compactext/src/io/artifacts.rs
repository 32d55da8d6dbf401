//! # Artifact Naming
//!
//! | artifact        | per-file layout       | run-wide layout       |
//! |-----------------|-----------------------|-----------------------|
//! | vocabulary      | `<stem>_vocab.bin`    | `<dir>/vocab.bin`     |
//! | encoded stream  | `<stem>_texto.bin`    | `<stem>_texto.bin`    |
//! | decoded text    | `<stem>_recon.txt`    | `<stem>_recon.txt`    |

use crate::errors::{CompactError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix of a per-file vocabulary.
pub const VOCAB_SUFFIX: &str = "_vocab.bin";

/// Suffix of an encoded stream.
pub const STREAM_SUFFIX: &str = "_texto.bin";

/// Suffix of a reconstructed text.
pub const RECON_SUFFIX: &str = "_recon.txt";

/// File name of a run-wide vocabulary.
pub const RUN_WIDE_VOCAB: &str = "vocab.bin";

/// Where the vocabulary of an encode run is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactLayout {
    /// One `<stem>_vocab.bin` beside every stream, each holding the run's
    /// vocabulary.
    #[default]
    PerFile,

    /// One `vocab.bin` per output directory, shared by every stream in it.
    RunWide,
}

/// `path` without its final extension; the parent directory is kept.
///
/// `docs/messi.txt` becomes `docs/messi`.
pub fn stem_of<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    match path.file_stem() {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

/// The stem of `path`, moved into `out_dir` when one is given.
fn stem_in(
    stem: PathBuf,
    out_dir: Option<&Path>,
) -> PathBuf {
    match (out_dir, stem.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => stem,
    }
}

/// `stem` with `suffix` appended to its last component.
fn with_suffix(
    stem: &Path,
    suffix: &str,
) -> PathBuf {
    let mut name: OsString = stem.as_os_str().to_owned();
    name.push(suffix);
    name.into()
}

/// The directory holding a stem's artifacts.
fn stem_dir(stem: &Path) -> PathBuf {
    match stem.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Output paths for one encoded input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    /// The artifact stem.
    pub stem: PathBuf,

    /// The vocabulary file.
    pub vocab: PathBuf,

    /// The encoded stream file.
    pub stream: PathBuf,
}

impl ArtifactPaths {
    /// Paths for encoding `input`.
    ///
    /// # Arguments
    /// * `input` - the source text path.
    /// * `layout` - the vocabulary layout.
    /// * `out_dir` - directory overriding the input's own.
    pub fn for_input<P: AsRef<Path>>(
        input: P,
        layout: ArtifactLayout,
        out_dir: Option<&Path>,
    ) -> Self {
        let stem = stem_in(stem_of(input), out_dir);
        let vocab = match layout {
            ArtifactLayout::PerFile => with_suffix(&stem, VOCAB_SUFFIX),
            ArtifactLayout::RunWide => stem_dir(&stem).join(RUN_WIDE_VOCAB),
        };
        let stream = with_suffix(&stem, STREAM_SUFFIX);
        Self {
            stem,
            vocab,
            stream,
        }
    }

    /// The per-file vocabulary path of this stem, whatever the layout.
    ///
    /// Decode prefers it over a run-wide `vocab.bin`.
    pub fn per_file_vocab(&self) -> PathBuf {
        with_suffix(&self.stem, VOCAB_SUFFIX)
    }
}

/// Input and output paths for decoding one stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeTarget {
    /// The artifact stem.
    pub stem: PathBuf,

    /// The encoded stream file.
    pub stream: PathBuf,

    /// The reconstructed text file.
    pub output: PathBuf,
}

impl DecodeTarget {
    /// Resolve a command-line argument to a decode target.
    ///
    /// Accepts a bare stem, `<stem>.txt`, or any artifact file name.
    ///
    /// A `.txt` argument whose own stem has a stream on disk resolves to that
    /// stem, so an input named `foo_recon.txt` decodes as `foo_recon`.
    pub fn resolve<P: AsRef<Path>>(
        arg: P,
        out_dir: Option<&Path>,
    ) -> Self {
        let arg = arg.as_ref();
        let plain = match arg.extension() {
            Some(ext) if ext == "txt" => Some(stem_of(arg)),
            _ => None,
        };
        let stripped = arg
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| {
                [VOCAB_SUFFIX, STREAM_SUFFIX, RECON_SUFFIX]
                    .iter()
                    .find_map(|suffix| name.strip_suffix(suffix))
                    .filter(|s| !s.is_empty())
                    .map(|s| arg.with_file_name(s))
            });
        let stem = match (plain, stripped) {
            (Some(plain), _) if with_suffix(&plain, STREAM_SUFFIX).is_file() => plain,
            (_, Some(stripped)) => stripped,
            (Some(plain), None) => plain,
            (None, None) => arg.to_path_buf(),
        };

        let stream = with_suffix(&stem, STREAM_SUFFIX);
        let output = with_suffix(&stem_in(stem.clone(), out_dir), RECON_SUFFIX);
        Self {
            stem,
            stream,
            output,
        }
    }

    /// Vocabulary paths to try, in order.
    pub fn vocab_candidates(&self) -> [PathBuf; 2] {
        [
            with_suffix(&self.stem, VOCAB_SUFFIX),
            stem_dir(&self.stem).join(RUN_WIDE_VOCAB),
        ]
    }

    /// The first existing vocabulary candidate.
    ///
    /// # Errors
    /// [`CompactError::VocabularyMissing`] naming the per-file path.
    pub fn locate_vocab(&self) -> Result<PathBuf> {
        let [per_file, run_wide] = self.vocab_candidates();
        if per_file.is_file() {
            Ok(per_file)
        } else if run_wide.is_file() {
            Ok(run_wide)
        } else {
            Err(CompactError::VocabularyMissing(per_file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of("docs/messi.txt"), PathBuf::from("docs/messi"));
        assert_eq!(stem_of("a.b.txt"), PathBuf::from("a.b"));
        assert_eq!(stem_of("notes"), PathBuf::from("notes"));
    }

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::for_input("docs/messi.txt", ArtifactLayout::PerFile, None);
        assert_eq!(paths.stem, PathBuf::from("docs/messi"));
        assert_eq!(paths.vocab, PathBuf::from("docs/messi_vocab.bin"));
        assert_eq!(paths.stream, PathBuf::from("docs/messi_texto.bin"));

        let paths = ArtifactPaths::for_input("messi.txt", ArtifactLayout::RunWide, None);
        assert_eq!(paths.vocab, PathBuf::from("./vocab.bin"));
        assert_eq!(paths.stream, PathBuf::from("messi_texto.bin"));

        let out = Path::new("out");
        let paths = ArtifactPaths::for_input("docs/messi.txt", ArtifactLayout::RunWide, Some(out));
        assert_eq!(paths.stem, PathBuf::from("out/messi"));
        assert_eq!(paths.vocab, PathBuf::from("out/vocab.bin"));
        assert_eq!(paths.stream, PathBuf::from("out/messi_texto.bin"));
    }

    #[test]
    fn test_decode_target_resolution() {
        for arg in [
            "docs/messi",
            "docs/messi.txt",
            "docs/messi_texto.bin",
            "docs/messi_vocab.bin",
            "docs/messi_recon.txt",
        ] {
            let target = DecodeTarget::resolve(arg, None);
            assert_eq!(target.stem, PathBuf::from("docs/messi"), "{arg}");
            assert_eq!(target.stream, PathBuf::from("docs/messi_texto.bin"));
            assert_eq!(target.output, PathBuf::from("docs/messi_recon.txt"));
        }

        let target = DecodeTarget::resolve("docs/messi", Some(Path::new("out")));
        assert_eq!(target.stream, PathBuf::from("docs/messi_texto.bin"));
        assert_eq!(target.output, PathBuf::from("out/messi_recon.txt"));

        let [per_file, run_wide] = target.vocab_candidates();
        assert_eq!(per_file, PathBuf::from("docs/messi_vocab.bin"));
        assert_eq!(run_wide, PathBuf::from("docs/vocab.bin"));
    }

    #[test]
    fn test_recon_named_input_resolves_to_its_own_stem() {
        tempdir::TempDir::new("artifacts_test")
            .and_then(|dir| {
                let input = dir.path().join("foo_recon.txt");

                // No stream yet: the artifact suffix wins.
                let target = DecodeTarget::resolve(&input, None);
                assert_eq!(target.stem, dir.path().join("foo"));

                let paths = ArtifactPaths::for_input(&input, ArtifactLayout::PerFile, None);
                std::fs::write(&paths.stream, b"")?;
                let target = DecodeTarget::resolve(&input, None);
                assert_eq!(target.stem, paths.stem);
                assert_eq!(target.stream, dir.path().join("foo_recon_texto.bin"));
                assert_eq!(target.output, dir.path().join("foo_recon_recon.txt"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_locate_vocab() {
        tempdir::TempDir::new("artifacts_test")
            .and_then(|dir| {
                let stem = dir.path().join("doc");
                let target = DecodeTarget::resolve(&stem, None);

                assert!(matches!(
                    target.locate_vocab(),
                    Err(CompactError::VocabularyMissing(_))
                ));

                std::fs::write(dir.path().join(RUN_WIDE_VOCAB), b"")?;
                assert_eq!(target.locate_vocab().unwrap(), dir.path().join(RUN_WIDE_VOCAB));

                std::fs::write(dir.path().join("doc_vocab.bin"), b"")?;
                assert_eq!(target.locate_vocab().unwrap(), dir.path().join("doc_vocab.bin"));

                Ok(())
            })
            .unwrap();
    }
}
