//! # Threaded Strategy
//!
//! A fixed-size pool of `k` workers. Worker `w` owns inputs `i % k == w` (by
//! file) or positions `p % k == w` of every input (by position), as rank `w`
//! of a distributed world would. Vocabularies are built either privately and
//! reduced in worker order, or into one [`LockedVocabBuilder`].
//!
//! Without the `rayon` feature the same tasks run serially, in order.

use crate::encoders::assemble_stream;
use crate::engine::files::{FileReport, Source, encode_and_write, finish_run, write_encoded};
use crate::engine::{BuildMode, EncodeOptions, RunOutput, Sharding};
use crate::errors::Result;
use crate::protocol::{PositionedShard, place_by_position};
use crate::segmentation::SegmentedText;
use crate::types::{Position, Rank, TokenId};
use crate::vocab::{LocalVocab, LockedVocabBuilder, Vocabulary, merge_rank_ordered};
use std::path::PathBuf;

/// A fixed-size task pool.
pub struct TaskPool {
    #[cfg(feature = "rayon")]
    pool: rayon::ThreadPool,
}

impl TaskPool {
    /// Create a pool of `threads` workers.
    ///
    /// # Errors
    /// [`crate::CompactError::InvalidConfig`] if the pool cannot be built.
    pub fn new(threads: usize) -> Result<Self> {
        #[cfg(feature = "rayon")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|idx| format!("compactext-{idx}"))
                .build()
                .map_err(|e| crate::CompactError::InvalidConfig(e.to_string()))?;
            Ok(Self { pool })
        }
        #[cfg(not(feature = "rayon"))]
        {
            log::debug!("rayon disabled; {threads} tasks run serially");
            Ok(Self {})
        }
    }

    /// Run `f` over `tasks`; results keep task order.
    pub fn map<T, R, F>(
        &self,
        tasks: Vec<T>,
        f: F,
    ) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            self.pool.install(|| tasks.into_par_iter().map(f).collect())
        }
        #[cfg(not(feature = "rayon"))]
        {
            tasks.into_iter().map(f).collect()
        }
    }
}

/// Encode on a pool of `threads` workers.
pub(crate) fn encode(
    inputs: &[PathBuf],
    threads: usize,
    options: &EncodeOptions,
) -> Result<RunOutput> {
    let pool = TaskPool::new(threads)?;
    let sources: Vec<Source> = pool.map(inputs.iter().collect(), |p| Source::load(p));
    let texts: Vec<Option<SegmentedText<'_>>> = pool.map(sources.iter().collect(), Source::segment);

    let (vocab, files) = match options.sharding {
        Sharding::ByFile => by_file(&pool, threads, &sources, &texts, options)?,
        Sharding::ByPosition => by_position(&pool, threads, &sources, &texts, options)?,
    };
    finish_run(&vocab, &files, options)?;

    Ok(RunOutput {
        vocab_size: vocab.len(),
        files,
    })
}

/// Deal `(key, task)` pairs to `workers` lists; key `k` goes to worker
/// `k % workers`, keeping order within each list.
fn deal<T>(
    tasks: impl IntoIterator<Item = (usize, T)>,
    workers: usize,
) -> Vec<Vec<T>> {
    let workers = workers.max(1);
    let mut dealt: Vec<Vec<T>> = (0..workers).map(|_| Vec::new()).collect();
    for (key, task) in tasks {
        dealt[key % workers].push(task);
    }
    dealt
}

/// Build the run vocabulary from per-worker task lists.
///
/// With [`BuildMode::Reduction`] each worker observes its tasks in order into
/// one private vocabulary, and the merge visits workers in index order. The
/// ownership matches the distributed ranks, so both strategies number words
/// alike for the same worker count.
fn build_vocab<'t, T, F>(
    pool: &TaskPool,
    workers: Vec<Vec<T>>,
    tokens_of: F,
    options: &EncodeOptions,
) -> Vocabulary
where
    T: Send,
    F: Fn(T) -> Vec<&'t [u8]> + Send + Sync,
{
    let vocab = match options.build {
        BuildMode::Reduction => {
            let locals: Vec<LocalVocab> = pool.map(workers, |tasks| {
                let mut local = LocalVocab::new();
                for task in tasks {
                    local.observe_all(tokens_of(task));
                }
                local
            });
            merge_rank_ordered(&locals, options.merge_order)
        }
        BuildMode::Locked => {
            let builder = LockedVocabBuilder::new();
            pool.map(workers.into_iter().flatten().collect(), |task| {
                for token in tokens_of(task) {
                    builder.lookup_or_insert(token);
                }
            });
            builder.into_vocab()
        }
    };
    log::info!(
        "built vocabulary of {} words ({:?})",
        vocab.len(),
        options.build
    );
    vocab
}

fn by_file(
    pool: &TaskPool,
    threads: usize,
    sources: &[Source],
    texts: &[Option<SegmentedText<'_>>],
    options: &EncodeOptions,
) -> Result<(Vocabulary, Vec<FileReport>)> {
    let vocab = build_vocab(
        pool,
        deal(texts.iter().enumerate(), threads),
        |text| {
            text.as_ref()
                .map(|t| t.tokens().collect())
                .unwrap_or_default()
        },
        options,
    );

    let files = pool
        .map(sources.iter().zip(texts).collect(), |(source, text)| {
            encode_and_write(source, text.as_ref(), &vocab, options)
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    Ok((vocab, files))
}

fn by_position(
    pool: &TaskPool,
    threads: usize,
    sources: &[Source],
    texts: &[Option<SegmentedText<'_>>],
    options: &EncodeOptions,
) -> Result<(Vocabulary, Vec<FileReport>)> {
    // (file, worker) pairs, file-major.
    let slots: Vec<(usize, &SegmentedText<'_>, Rank)> = texts
        .iter()
        .enumerate()
        .filter_map(|(idx, text)| text.as_ref().map(|t| (idx, t)))
        .flat_map(|(idx, text)| (0..threads).map(move |rank| (idx, text, rank)))
        .collect();
    let shards: Vec<(usize, Rank, PositionedShard<'_>)> =
        pool.map(slots, |(idx, text, rank)| {
            (idx, rank, PositionedShard::strided(text, rank, threads))
        });

    let vocab = build_vocab(
        pool,
        deal(shards.iter().map(|entry| (entry.1, entry)), threads),
        |(_, _, shard)| shard.tokens.clone(),
        options,
    );

    let remapped: Vec<(usize, Result<Vec<TokenId>>)> =
        pool.map(shards.iter().collect(), |(idx, _, shard)| (*idx, shard.remap(&vocab)));

    let mut groups: Vec<Vec<(Vec<Position>, Vec<TokenId>)>> = vec![Vec::new(); texts.len()];
    for ((idx, ids), (_, _, shard)) in remapped.into_iter().zip(&shards) {
        groups[idx].push((shard.positions.clone(), ids?));
    }

    let files = pool
        .map(
            sources.iter().zip(texts).zip(groups).collect(),
            |((source, text), group)| match text {
                Some(text) => {
                    let ids = place_by_position(text.len(), group)?;
                    let stream = assemble_stream(text, &ids)?;
                    write_encoded(source, text, &stream, &vocab, options)
                }
                None => Ok(source.missing_report()),
            },
        )
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    Ok((vocab, files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{check_is_send, check_is_sync};

    #[test]
    fn test_deal() {
        let dealt = deal((0..7).map(|k| (k, k * 10)), 3);
        assert_eq!(dealt, vec![vec![0, 30, 60], vec![10, 40], vec![20, 50]]);

        let dealt: Vec<Vec<usize>> = deal(Vec::new(), 2);
        assert_eq!(dealt.len(), 2);
        assert!(dealt.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_task_pool_keeps_order() {
        let pool = TaskPool::new(3).unwrap();
        check_is_send(&pool);
        check_is_sync(&pool);

        let squares = pool.map((0..100u64).collect(), |x| x * x);
        assert_eq!(squares, (0..100u64).map(|x| x * x).collect::<Vec<_>>());
    }
}
