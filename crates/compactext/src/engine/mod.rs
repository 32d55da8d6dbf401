//! # Encode / Decode Engine
//!
//! Every strategy produces the same artifacts from the same inputs:
//!
//! * [`Strategy::Sequential`] - one thread, one vocabulary.
//! * [`Strategy::Threaded`] - a fixed-size pool; private vocabularies merged
//!   by reduction, or one locked vocabulary ([`BuildMode::Locked`]).
//! * [`Strategy::Distributed`] - a world of ranks sharing no memory, unified
//!   through collectives.
//!
//! The vocabulary always spans the whole run, so every input of one run
//! agrees on the id of every shared token.

pub mod decode;
pub mod distributed;
pub mod files;
pub mod sequential;
pub mod threaded;

pub use decode::{DecodeOptions, DecodeReport, DecodedFile, decode_files};
pub use files::{FileReport, FileStatus};

use crate::errors::{CompactError, Result};
use crate::io::{ArtifactLayout, ArtifactPaths};
use crate::vocab::MergeOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How the work of an encode run is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Single-threaded baseline.
    #[default]
    Sequential,

    /// Shared-memory thread pool.
    Threaded {
        /// Pool size.
        threads: usize,
    },

    /// Message-passing world; one thread per rank.
    Distributed {
        /// World size.
        workers: usize,
    },
}

impl Strategy {
    /// The number of concurrent workers.
    pub fn workers(&self) -> usize {
        match self {
            Strategy::Sequential => 1,
            Strategy::Threaded { threads } => *threads,
            Strategy::Distributed { workers } => *workers,
        }
    }
}

/// How work is split across workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sharding {
    /// Whole files; a worker owns every token of its files.
    #[default]
    ByFile,

    /// Token positions; worker `r` of `k` owns positions `p % k == r` of
    /// every file.
    ByPosition,
}

/// How the threaded strategy builds its vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Private per-worker vocabularies merged in worker order.
    #[default]
    Reduction,

    /// One vocabulary shared behind a mutex.
    ///
    /// Ids depend on thread scheduling.
    Locked,
}

/// Options for [`encode_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Execution strategy.
    pub strategy: Strategy,

    /// Work split.
    pub sharding: Sharding,

    /// Within-worker merge order.
    pub merge_order: MergeOrder,

    /// Vocabulary build mode.
    pub build: BuildMode,

    /// Vocabulary file layout.
    pub layout: ArtifactLayout,

    /// Directory for the artifacts; defaults to each input's own.
    pub out_dir: Option<PathBuf>,
}

impl EncodeOptions {
    /// Sets the strategy.
    pub fn with_strategy(
        self,
        strategy: Strategy,
    ) -> Self {
        Self { strategy, ..self }
    }

    /// Sets the sharding.
    pub fn with_sharding(
        self,
        sharding: Sharding,
    ) -> Self {
        Self { sharding, ..self }
    }

    /// Sets the merge order.
    pub fn with_merge_order(
        self,
        merge_order: MergeOrder,
    ) -> Self {
        Self {
            merge_order,
            ..self
        }
    }

    /// Sets the build mode.
    pub fn with_build(
        self,
        build: BuildMode,
    ) -> Self {
        Self { build, ..self }
    }

    /// Sets the artifact layout.
    pub fn with_layout(
        self,
        layout: ArtifactLayout,
    ) -> Self {
        Self { layout, ..self }
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

    /// Check that the options describe a runnable encode.
    ///
    /// # Errors
    /// [`CompactError::InvalidConfig`] for an empty pool or world, or a
    /// locked build without shared memory.
    pub fn validate(&self) -> Result<()> {
        if self.strategy.workers() == 0 {
            return Err(CompactError::InvalidConfig(format!(
                "{:?} needs at least one worker",
                self.strategy
            )));
        }
        if self.build == BuildMode::Locked
            && matches!(self.strategy, Strategy::Distributed { .. })
        {
            return Err(CompactError::InvalidConfig(
                "distributed ranks share no memory to lock".to_string(),
            ));
        }
        Ok(())
    }

    /// The artifact paths of one input.
    pub fn artifact_paths(
        &self,
        input: &Path,
    ) -> ArtifactPaths {
        ArtifactPaths::for_input(input, self.layout, self.out_dir.as_deref())
    }
}

/// What one strategy produced.
#[derive(Debug)]
pub(crate) struct RunOutput {
    pub vocab_size: usize,

    /// In input order.
    pub files: Vec<FileReport>,
}

/// Summary of an encode run.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeReport {
    /// Strategy used.
    pub strategy: Strategy,

    /// Sharding used.
    pub sharding: Sharding,

    /// Merge order used.
    pub merge_order: MergeOrder,

    /// Build mode used.
    pub build: BuildMode,

    /// Layout used.
    pub layout: ArtifactLayout,

    /// Size of the run's vocabulary.
    pub vocab_size: usize,

    /// One entry per input, in input order.
    pub files: Vec<FileReport>,

    /// Wall time of the run.
    pub elapsed_secs: f64,
}

impl EncodeReport {
    /// Inputs that could not be read.
    pub fn missing(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Missing)
    }

    /// True if any input could not be read.
    pub fn has_missing(&self) -> bool {
        self.missing().next().is_some()
    }

    /// Tokens encoded across all inputs.
    pub fn total_tokens(&self) -> usize {
        self.files.iter().map(|f| f.tokens).sum()
    }
}

/// Encode `inputs` into vocabulary and stream artifacts.
///
/// A missing or unreadable input is logged and reported; the rest of the run
/// continues. Protocol, codec and write errors abort the run, and two inputs
/// mapping to the same artifact stem are rejected before anything is written.
///
/// # Arguments
/// * `inputs` - source text paths.
/// * `options` - the run configuration.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(inputs)))]
pub fn encode_files<P: AsRef<Path>>(
    inputs: &[P],
    options: &EncodeOptions,
) -> Result<EncodeReport> {
    options.validate()?;
    let inputs: Vec<PathBuf> = inputs.iter().map(|p| p.as_ref().to_path_buf()).collect();
    files::check_distinct_stems(&inputs, options)?;
    if let Some(dir) = &options.out_dir {
        std::fs::create_dir_all(dir)?;
    }

    log::info!(
        "encoding {} files: {:?}, {:?}, {:?}",
        inputs.len(),
        options.strategy,
        options.sharding,
        options.layout
    );
    let start = Instant::now();

    let output = match options.strategy {
        Strategy::Sequential => sequential::encode(&inputs, options)?,
        Strategy::Threaded { threads } => threaded::encode(&inputs, threads, options)?,
        Strategy::Distributed { workers } => distributed::encode(&inputs, workers, options)?,
    };

    let report = EncodeReport {
        strategy: options.strategy,
        sharding: options.sharding,
        merge_order: options.merge_order,
        build: options.build,
        layout: options.layout,
        vocab_size: output.vocab_size,
        files: output.files,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    log::info!(
        "encoded {} tokens, {} distinct, in {:.4}s",
        report.total_tokens(),
        report.vocab_size,
        report.elapsed_secs
    );
    Ok(report)
}
