//! # Vocabulary Unifier
//!
//! 1. Every rank serializes its local words ([`encode_word_list`]).
//! 2. The root gathers sizes then blobs, and decodes them tagged by rank.
//! 3. The root merges them in ascending rank order ([`merge_rank_ordered`]).
//! 4. The root broadcasts the canonical vocabulary in the vocabulary file
//!    format; every rank decodes the same [`Vocabulary`].

use crate::collective::Communicator;
use crate::errors::Result;
use crate::io::binary_codec::{read_vocabulary, vocabulary_to_bytes};
use crate::protocol::wire::{decode_word_list, encode_word_list};
use crate::vocab::{LocalVocab, MergeOrder, Vocabulary, merge_rank_ordered};

/// Merge every rank's local vocabulary into the canonical one.
///
/// Collective: every rank of `comm` must call it.
///
/// # Returns
/// The same canonical [`Vocabulary`] on every rank.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(comm, local)))]
pub fn unify_vocabulary<C: Communicator + ?Sized>(
    comm: &mut C,
    local: &LocalVocab,
    order: MergeOrder,
) -> Result<Vocabulary> {
    let blob = encode_word_list(local.as_words())?;
    log::debug!(
        "rank {}: offering {} words ({} bytes)",
        comm.rank(),
        local.len(),
        blob.len()
    );

    let merged = match comm.gather_blob(blob)? {
        Some(blobs) => {
            let ranks = blobs
                .iter()
                .map(|blob| decode_word_list(blob))
                .collect::<Result<Vec<_>>>()?;
            let vocab = merge_rank_ordered(&ranks, order);
            log::info!(
                "merged {} ranks into {} distinct words",
                ranks.len(),
                vocab.len()
            );
            Some(vocab)
        }
        None => None,
    };

    let payload = merged.as_ref().map(vocabulary_to_bytes).transpose()?;
    let bytes = comm.broadcast_blob(payload)?;
    match merged {
        Some(vocab) => Ok(vocab),
        None => read_vocabulary(&mut bytes.as_slice()),
    }
}
