//! # Position-Preserving Assembler
//!
//! With position sharding, rank `r` of `k` owns the tokens at positions
//! `p % k == r`. Each rank keeps the position of every token it owns; after
//! the canonical vocabulary is known it remaps its tokens, and the root puts
//! every id back at `output[position]`.

use crate::collective::{Communicator, ROOT_RANK};
use crate::errors::{CompactError, Result};
use crate::protocol::wire::{decode_ids, decode_positions, encode_ids, encode_positions};
use crate::segmentation::SegmentedText;
use crate::types::{NO_TOKEN, Position, Rank, TokenId};
use crate::vocab::{LocalVocab, Vocabulary};

/// The tokens one rank owns, with their original positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionedShard<'a> {
    /// Position of each owned token, ascending.
    pub positions: Vec<Position>,

    /// The owned tokens; `tokens[i]` sits at `positions[i]`.
    pub tokens: Vec<&'a [u8]>,
}

impl<'a> PositionedShard<'a> {
    /// Take every `stride`-th token of `text`, starting at `rank`.
    pub fn strided(
        text: &SegmentedText<'a>,
        rank: Rank,
        stride: usize,
    ) -> Self {
        let (positions, tokens) = text.strided(rank, stride).map(|(p, s)| (p, s.token)).unzip();
        Self { positions, tokens }
    }

    /// The number of owned tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the shard owns no token.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The shard's distinct words, in first-seen order.
    pub fn local_vocab(&self) -> LocalVocab {
        self.tokens.iter().copied().collect()
    }

    /// Map every owned token to its canonical id.
    pub fn remap(
        &self,
        vocab: &Vocabulary,
    ) -> Result<Vec<TokenId>> {
        self.tokens
            .iter()
            .map(|token| vocab.try_lookup_token(token))
            .collect()
    }
}

fn misplaced(reason: String) -> CompactError {
    CompactError::collective("assemble", ROOT_RANK, reason)
}

/// Write every shard's ids at their positions in an array of length `total`.
///
/// # Arguments
/// * `total` - the token count of the document.
/// * `shards` - `(positions, ids)` per rank, indexed by rank.
///
/// # Errors
/// [`CompactError::CollectiveFailure`] if a position is out of range,
/// reported twice, or never reported.
pub fn place_by_position<I>(
    total: usize,
    shards: I,
) -> Result<Vec<TokenId>>
where
    I: IntoIterator<Item = (Vec<Position>, Vec<TokenId>)>,
{
    let mut output = vec![NO_TOKEN; total];
    for (rank, (positions, ids)) in shards.into_iter().enumerate() {
        if positions.len() != ids.len() {
            return Err(misplaced(format!(
                "rank {rank} sent {} positions for {} ids",
                positions.len(),
                ids.len()
            )));
        }
        for (p, id) in positions.into_iter().zip(ids) {
            if id == NO_TOKEN {
                return Err(misplaced(format!("rank {rank} sent id 0 for position {p}")));
            }
            match output.get_mut(p) {
                None => {
                    return Err(misplaced(format!(
                        "rank {rank} reported position {p} of {total}"
                    )));
                }
                Some(slot) if *slot != NO_TOKEN => {
                    return Err(misplaced(format!(
                        "rank {rank} reported position {p} twice"
                    )));
                }
                Some(slot) => *slot = id,
            }
        }
    }
    if let Some(p) = output.iter().position(|&id| id == NO_TOKEN) {
        return Err(misplaced(format!("position {p} was never reported")));
    }
    Ok(output)
}

/// Remap a shard and gather the ids, in document order, on the root.
///
/// Collective: every rank of `comm` must call it.
///
/// # Arguments
/// * `comm` - the world.
/// * `shard` - this rank's tokens.
/// * `vocab` - the canonical vocabulary.
/// * `total` - the token count of the document.
///
/// # Returns
/// `Some(ids)` with `ids[p]` the id at position `p` on the root, `None`
/// elsewhere.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(comm, shard, vocab)))]
pub fn gather_positioned<C: Communicator + ?Sized>(
    comm: &mut C,
    shard: &PositionedShard<'_>,
    vocab: &Vocabulary,
    total: usize,
) -> Result<Option<Vec<TokenId>>> {
    let ids = shard.remap(vocab)?;
    let positions = comm.gather_blob(encode_positions(&shard.positions))?;
    let ids = comm.gather_blob(encode_ids(&ids))?;

    match (positions, ids) {
        (Some(positions), Some(ids)) => {
            let shards = positions
                .iter()
                .zip(&ids)
                .map(|(p, i)| Ok((decode_positions(p)?, decode_ids(i)?)))
                .collect::<Result<Vec<_>>>()?;
            place_by_position(total, shards).map(Some)
        }
        _ => Ok(None),
    }
}
