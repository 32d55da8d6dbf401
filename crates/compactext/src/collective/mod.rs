//! # Collectives
//!
//! Gather / broadcast between the ranks of a world. Rank [`ROOT_RANK`] is the
//! coordinator; every collective is a barrier over all ranks, and every rank
//! must call the same collectives in the same order.
//!
//! A rank that leaves the world early (returns, fails or panics) turns the
//! next collective of every survivor into a
//! [`CompactError::CollectiveFailure`].

pub mod channel_comm;
pub mod world;

pub use channel_comm::ChannelCommunicator;
pub use world::run_world;

use crate::errors::{CompactError, Result};
use crate::types::Rank;

/// The coordinating rank.
pub const ROOT_RANK: Rank = 0;

/// One rank's endpoint into a world.
pub trait Communicator: Send {
    /// This rank.
    fn rank(&self) -> Rank;

    /// The number of ranks in the world.
    fn size(&self) -> usize;

    /// True on the coordinating rank.
    fn is_root(&self) -> bool {
        self.rank() == ROOT_RANK
    }

    /// Gather one word from every rank.
    ///
    /// # Returns
    /// `Some(words)` indexed by rank on the root, `None` elsewhere.
    fn gather_word(
        &mut self,
        value: u64,
    ) -> Result<Option<Vec<u64>>>;

    /// Gather one byte buffer from every rank.
    ///
    /// # Returns
    /// `Some(buffers)` indexed by rank on the root, `None` elsewhere.
    fn gather_bytes(
        &mut self,
        bytes: Vec<u8>,
    ) -> Result<Option<Vec<Vec<u8>>>>;

    /// Broadcast one word from the root.
    ///
    /// The root passes `Some(value)`; other ranks pass `None`.
    fn broadcast_word(
        &mut self,
        value: Option<u64>,
    ) -> Result<u64>;

    /// Broadcast one byte buffer from the root.
    ///
    /// The root passes `Some(bytes)`; other ranks pass `None`.
    fn broadcast_bytes(
        &mut self,
        bytes: Option<Vec<u8>>,
    ) -> Result<Vec<u8>>;

    /// Gather a blob from every rank: sizes first, then bytes.
    ///
    /// # Errors
    /// [`CompactError::CollectiveFailure`] if a peer is gone, or if a blob's
    /// length disagrees with its announced size.
    fn gather_blob(
        &mut self,
        blob: Vec<u8>,
    ) -> Result<Option<Vec<Vec<u8>>>> {
        let sizes = self.gather_word(blob.len() as u64)?;
        let blobs = self.gather_bytes(blob)?;
        match (sizes, blobs) {
            (Some(sizes), Some(blobs)) => {
                for (rank, (size, blob)) in sizes.iter().zip(&blobs).enumerate() {
                    if *size != blob.len() as u64 {
                        return Err(CompactError::collective(
                            "gather",
                            self.rank(),
                            format!(
                                "rank {rank} announced {size} bytes, sent {}",
                                blob.len()
                            ),
                        ));
                    }
                }
                Ok(Some(blobs))
            }
            (None, None) => Ok(None),
            _ => Err(CompactError::collective(
                "gather",
                self.rank(),
                "size and payload gathers disagree on the root",
            )),
        }
    }

    /// Broadcast a blob from the root: size first, then bytes.
    fn broadcast_blob(
        &mut self,
        blob: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let size = self.broadcast_word(blob.as_ref().map(|b| b.len() as u64))?;
        let bytes = self.broadcast_bytes(blob)?;
        if size != bytes.len() as u64 {
            return Err(CompactError::collective(
                "broadcast",
                self.rank(),
                format!("announced {size} bytes, received {}", bytes.len()),
            ));
        }
        Ok(bytes)
    }
}
