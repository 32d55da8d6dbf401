//! # Distributed Strategy
//!
//! One rank per worker thread; ranks share nothing and talk only through
//! collectives. Phases run in lock-step: build, merge, broadcast, remap,
//! write.
//!
//! * By file: rank `r` of `k` owns inputs `i % k == r`, reads them itself
//!   and writes their artifacts.
//! * By position: the root reads every input and broadcasts it; rank `r`
//!   owns positions `p % k == r` of each one, and the root reassembles and
//!   writes every stream.

use crate::collective::{Communicator, ROOT_RANK, run_world};
use crate::encoders::assemble_stream;
use crate::engine::files::{
    FileReport, Source, encode_and_write, finish_run, read_input, write_encoded,
    write_run_wide_vocab,
};
use crate::engine::{EncodeOptions, RunOutput, Sharding};
use crate::errors::{CompactError, Result};
use crate::io::ArtifactLayout;
use crate::protocol::wire::{decode_positions, encode_positions};
use crate::protocol::{PositionedShard, gather_positioned, unify_vocabulary};
use crate::segmentation::SegmentedText;
use crate::vocab::LocalVocab;
use std::path::PathBuf;

/// What one rank hands back to the launcher.
struct RankOutput {
    vocab_size: usize,

    /// `(input index, report)` for the inputs this rank reports on.
    files: Vec<(usize, FileReport)>,
}

/// Encode on a world of `workers` ranks.
pub(crate) fn encode(
    inputs: &[PathBuf],
    workers: usize,
    options: &EncodeOptions,
) -> Result<RunOutput> {
    let ranks = match options.sharding {
        Sharding::ByFile => run_world(workers, |comm| by_file(comm, inputs, options))?,
        Sharding::ByPosition => run_world(workers, |comm| by_position(comm, inputs, options))?,
    };

    let vocab_size = ranks.first().map(|r| r.vocab_size).unwrap_or(0);
    let mut files: Vec<(usize, FileReport)> = ranks.into_iter().flat_map(|r| r.files).collect();
    files.sort_by_key(|(idx, _)| *idx);
    if files.len() != inputs.len() {
        return Err(CompactError::collective(
            "report",
            ROOT_RANK,
            format!("{} reports for {} inputs", files.len(), inputs.len()),
        ));
    }

    Ok(RunOutput {
        vocab_size,
        files: files.into_iter().map(|(_, report)| report).collect(),
    })
}

fn by_file<C: Communicator>(
    mut comm: C,
    inputs: &[PathBuf],
    options: &EncodeOptions,
) -> Result<RankOutput> {
    let (rank, size) = (comm.rank(), comm.size());

    let owned: Vec<(usize, Source)> = inputs
        .iter()
        .enumerate()
        .filter(|(idx, _)| idx % size == rank)
        .map(|(idx, path)| (idx, Source::load(path)))
        .collect();
    let texts: Vec<Option<SegmentedText<'_>>> = owned.iter().map(|(_, s)| s.segment()).collect();

    let mut local = LocalVocab::new();
    for text in texts.iter().flatten() {
        local.observe_all(text.tokens());
    }
    log::debug!(
        "rank {rank}: {} inputs, {} distinct words",
        owned.len(),
        local.len()
    );

    let vocab = unify_vocabulary(&mut comm, &local, options.merge_order)?;

    let mut files = Vec::with_capacity(owned.len());
    for ((idx, source), text) in owned.iter().zip(&texts) {
        files.push((*idx, encode_and_write(source, text.as_ref(), &vocab, options)?));
    }

    // The root learns which inputs were encoded and writes the shared
    // vocabulary beside them.
    let encoded: Vec<usize> = files
        .iter()
        .filter(|(_, f)| f.stream.is_some())
        .map(|(idx, _)| *idx)
        .collect();
    if let Some(blobs) = comm.gather_blob(encode_positions(&encoded))?
        && options.layout == ArtifactLayout::RunWide
    {
        let mut paths = Vec::new();
        for blob in &blobs {
            for idx in decode_positions(blob)? {
                let input = inputs.get(idx).ok_or_else(|| {
                    CompactError::collective("gather", rank, format!("unknown input {idx}"))
                })?;
                paths.push(options.artifact_paths(input).vocab);
            }
        }
        write_run_wide_vocab(&vocab, paths.iter().map(PathBuf::as_path))?;
    }

    Ok(RankOutput {
        vocab_size: vocab.len(),
        files,
    })
}

fn by_position<C: Communicator>(
    mut comm: C,
    inputs: &[PathBuf],
    options: &EncodeOptions,
) -> Result<RankOutput> {
    let (rank, size) = (comm.rank(), comm.size());

    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        let loaded = comm.is_root().then(|| read_input(path));
        let present = comm.broadcast_word(loaded.as_ref().map(|r| r.is_ok() as u64))?;
        let data = if present == 1 {
            Ok(comm.broadcast_blob(loaded.and_then(Result::ok))?)
        } else {
            match loaded {
                Some(loaded) => loaded,
                None => Err(CompactError::InputNotFound {
                    path: path.clone(),
                    source: std::io::ErrorKind::NotFound.into(),
                }),
            }
        };
        sources.push(if comm.is_root() {
            Source::new(path, data)
        } else {
            Source {
                path: path.clone(),
                data,
            }
        });
    }

    let texts: Vec<Option<SegmentedText<'_>>> = sources.iter().map(Source::segment).collect();
    let shards: Vec<Option<PositionedShard<'_>>> = texts
        .iter()
        .map(|t| t.as_ref().map(|t| PositionedShard::strided(t, rank, size)))
        .collect();

    let mut local = LocalVocab::new();
    for shard in shards.iter().flatten() {
        local.observe_all(shard.tokens.iter().copied());
    }
    log::debug!(
        "rank {rank}: {} positions, {} distinct words",
        shards.iter().flatten().map(PositionedShard::len).sum::<usize>(),
        local.len()
    );

    let vocab = unify_vocabulary(&mut comm, &local, options.merge_order)?;

    let mut files = Vec::new();
    for (idx, ((source, text), shard)) in sources.iter().zip(&texts).zip(&shards).enumerate() {
        match (text, shard) {
            (Some(text), Some(shard)) => {
                if let Some(ids) = gather_positioned(&mut comm, shard, &vocab, text.len())? {
                    let stream = assemble_stream(text, &ids)?;
                    files.push((idx, write_encoded(source, text, &stream, &vocab, options)?));
                }
            }
            _ if comm.is_root() => files.push((idx, source.missing_report())),
            _ => {}
        }
    }

    if comm.is_root() {
        let reports: Vec<FileReport> = files.iter().map(|(_, f)| f.clone()).collect();
        finish_run(&vocab, &reports, options)?;
    }

    Ok(RankOutput {
        vocab_size: vocab.len(),
        files,
    })
}
