//! # Sequential Strategy

use crate::engine::files::{Source, encode_and_write, finish_run};
use crate::engine::{EncodeOptions, RunOutput};
use crate::errors::Result;
use crate::segmentation::SegmentedText;
use crate::vocab::{LocalVocab, merge_rank_ordered};
use std::path::PathBuf;

/// Encode every input on the calling thread.
///
/// The calling thread is the only worker: it observes every input in order
/// and the merge applies the run's [`crate::vocab::MergeOrder`]. Sharding and
/// build mode are moot with a single worker.
pub(crate) fn encode(
    inputs: &[PathBuf],
    options: &EncodeOptions,
) -> Result<RunOutput> {
    let sources: Vec<Source> = inputs.iter().map(|p| Source::load(p)).collect();
    let texts: Vec<Option<SegmentedText<'_>>> = sources.iter().map(Source::segment).collect();

    let mut local = LocalVocab::new();
    for text in texts.iter().flatten() {
        local.observe_all(text.tokens());
    }
    let vocab = merge_rank_ordered([local], options.merge_order);
    log::info!("built vocabulary of {} words", vocab.len());

    let files = sources
        .iter()
        .zip(&texts)
        .map(|(source, text)| encode_and_write(source, text.as_ref(), &vocab, options))
        .collect::<Result<Vec<_>>>()?;
    finish_run(&vocab, &files, options)?;

    Ok(RunOutput {
        vocab_size: vocab.len(),
        files,
    })
}
