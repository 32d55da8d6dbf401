//! # Decode Driver

use crate::decoders::{Reconstructor, SeparatorMode};
use crate::encoders::StreamRecord;
use crate::errors::Result;
use crate::io::{DecodeTarget, load_token_table_path, open_stream_path};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for [`decode_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Separator handling.
    pub mode: SeparatorMode,

    /// Directory for the reconstructed text; defaults to each stem's own.
    pub out_dir: Option<PathBuf>,

    /// Decode targets concurrently.
    pub parallel: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            mode: SeparatorMode::default(),
            out_dir: None,
            parallel: crate::DEFAULT_PARALLEL,
        }
    }
}

impl DecodeOptions {
    /// Sets the separator mode.
    pub fn with_mode(
        self,
        mode: SeparatorMode,
    ) -> Self {
        Self { mode, ..self }
    }

    /// Sets the output directory.
    pub fn with_out_dir<P: Into<PathBuf>>(
        self,
        out_dir: Option<P>,
    ) -> Self {
        Self {
            out_dir: out_dir.map(Into::into),
            ..self
        }
    }

    /// Sets whether targets are decoded concurrently.
    ///
    /// Only effective with the `rayon` feature.
    pub fn with_parallel(
        self,
        parallel: bool,
    ) -> Self {
        Self { parallel, ..self }
    }
}

/// One reconstructed file.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedFile {
    /// The stream read.
    pub stream: PathBuf,

    /// The vocabulary read.
    pub vocab: PathBuf,

    /// The text written.
    pub output: PathBuf,

    /// Tokens replayed.
    pub tokens: usize,

    /// Bytes written.
    pub bytes: u64,
}

/// Summary of a decode run.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Separator mode used.
    pub mode: SeparatorMode,

    /// One entry per target, in argument order.
    pub files: Vec<DecodedFile>,

    /// Wall time of the run.
    pub elapsed_secs: f64,
}

/// Where a reconstruction is written until it completes.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    name.into()
}

/// Reconstruct `records` into `path`; returns `(tokens, bytes)`.
fn write_partial<I>(
    decoder: &Reconstructor,
    records: I,
    path: &Path,
) -> Result<(usize, u64)>
where
    I: IntoIterator<Item = Result<StreamRecord>>,
{
    let mut out = BufWriter::new(File::create(path)?);
    let tokens = decoder.reconstruct_to(records, &mut out)?;
    out.flush()?;
    let bytes = out.get_ref().metadata()?.len();
    Ok((tokens, bytes))
}

/// Reconstruct one target.
///
/// The text is written beside the output and renamed into place once the
/// whole stream decoded; a failed decode leaves no output behind.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(options)))]
pub fn decode_target(
    target: &DecodeTarget,
    options: &DecodeOptions,
) -> Result<DecodedFile> {
    let vocab = target.locate_vocab()?;
    let table = load_token_table_path(&vocab)?;
    let records = open_stream_path(&target.stream)?;

    let decoder = Reconstructor::new(table, options.mode);
    let partial = partial_path(&target.output);
    let written = write_partial(&decoder, records, &partial);
    let (tokens, bytes) = match written {
        Ok(counts) => counts,
        Err(err) => {
            if let Err(e) = std::fs::remove_file(&partial)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                log::warn!("could not remove {}: {e}", partial.display());
            }
            return Err(err);
        }
    };
    std::fs::rename(&partial, &target.output)?;

    log::debug!(
        "{} -> {} ({tokens} tokens)",
        target.stream.display(),
        target.output.display()
    );
    Ok(DecodedFile {
        stream: target.stream.clone(),
        vocab,
        output: target.output.clone(),
        tokens,
        bytes,
    })
}

/// Reconstruct the text of every stem.
///
/// Each argument may be a stem, `<stem>.txt`, or any artifact path of the
/// stem. The first missing vocabulary or stream aborts the run.
pub fn decode_files<P: AsRef<Path>>(
    stems: &[P],
    options: &DecodeOptions,
) -> Result<DecodeReport> {
    if let Some(dir) = &options.out_dir {
        std::fs::create_dir_all(dir)?;
    }
    let targets: Vec<DecodeTarget> = stems
        .iter()
        .map(|s| DecodeTarget::resolve(s, options.out_dir.as_deref()))
        .collect();

    log::info!("decoding {} files", targets.len());
    let start = Instant::now();

    #[cfg(feature = "rayon")]
    let files = if options.parallel {
        use rayon::prelude::*;
        targets
            .par_iter()
            .map(|t| decode_target(t, options))
            .collect::<Result<Vec<_>>>()?
    } else {
        targets
            .iter()
            .map(|t| decode_target(t, options))
            .collect::<Result<Vec<_>>>()?
    };
    #[cfg(not(feature = "rayon"))]
    let files = targets
        .iter()
        .map(|t| decode_target(t, options))
        .collect::<Result<Vec<_>>>()?;

    let report = DecodeReport {
        mode: options.mode,
        files,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    log::info!(
        "decoded {} files in {:.4}s",
        report.files.len(),
        report.elapsed_secs
    );
    Ok(report)
}
