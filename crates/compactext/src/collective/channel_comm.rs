//! # Channel Communicator
//!
//! A star of `std::sync::mpsc` channels: every non-root rank has one uplink
//! to the root and one downlink from it. Channels are FIFO per rank, so
//! collectives issued in the same order on every rank never interleave.

use crate::collective::{Communicator, ROOT_RANK};
use crate::errors::{CompactError, Result};
use crate::types::Rank;
use std::sync::mpsc::{Receiver, Sender, channel};

/// A message on a link.
#[derive(Debug)]
enum Message {
    Word(u64),
    Bytes(Vec<u8>),

    /// Ends a collective; flows against the data.
    Release,
}

impl Message {
    fn kind(&self) -> &'static str {
        match self {
            Message::Word(_) => "word",
            Message::Bytes(_) => "bytes",
            Message::Release => "release",
        }
    }
}

#[derive(Debug)]
enum Links {
    /// Indexed by `rank - 1`.
    Root {
        uplinks: Vec<Receiver<Message>>,
        downlinks: Vec<Sender<Message>>,
    },
    Leaf {
        up: Sender<Message>,
        down: Receiver<Message>,
    },
}

/// A [`Communicator`] over in-process channels.
#[derive(Debug)]
pub struct ChannelCommunicator {
    rank: Rank,
    size: usize,
    links: Links,
}

impl ChannelCommunicator {
    /// Create the endpoints of a world of `size` ranks, indexed by rank.
    ///
    /// # Errors
    /// [`CompactError::InvalidConfig`] if `size` is zero.
    pub fn world(size: usize) -> Result<Vec<Self>> {
        if size == 0 {
            return Err(CompactError::InvalidConfig(
                "a world needs at least one rank".to_string(),
            ));
        }

        let mut uplinks = Vec::with_capacity(size - 1);
        let mut downlinks = Vec::with_capacity(size - 1);
        let mut leaves = Vec::with_capacity(size - 1);
        for rank in 1..size {
            let (up, up_rx) = channel();
            let (down_tx, down) = channel();
            uplinks.push(up_rx);
            downlinks.push(down_tx);
            leaves.push(Self {
                rank,
                size,
                links: Links::Leaf { up, down },
            });
        }

        let root = Self {
            rank: ROOT_RANK,
            size,
            links: Links::Root { uplinks, downlinks },
        };
        Ok(std::iter::once(root).chain(leaves).collect())
    }

    fn failure(
        &self,
        op: &'static str,
        reason: impl Into<String>,
    ) -> CompactError {
        CompactError::collective(op, self.rank, reason)
    }

    fn gather_with<T>(
        &mut self,
        op: &'static str,
        payload: T,
        wrap: fn(T) -> Message,
        unwrap: fn(Message) -> std::result::Result<T, Message>,
    ) -> Result<Option<Vec<T>>> {
        match &self.links {
            Links::Root { uplinks, downlinks } => {
                let mut values = Vec::with_capacity(self.size);
                values.push(payload);
                for (idx, uplink) in uplinks.iter().enumerate() {
                    let peer = idx + 1;
                    let msg = uplink
                        .recv()
                        .map_err(|_| self.failure(op, format!("rank {peer} is gone")))?;
                    let value = unwrap(msg).map_err(|other| {
                        self.failure(op, format!("rank {peer} sent {}", other.kind()))
                    })?;
                    values.push(value);
                }
                for (idx, downlink) in downlinks.iter().enumerate() {
                    downlink
                        .send(Message::Release)
                        .map_err(|_| self.failure(op, format!("rank {} is gone", idx + 1)))?;
                }
                Ok(Some(values))
            }
            Links::Leaf { up, down } => {
                up.send(wrap(payload))
                    .map_err(|_| self.failure(op, "root is gone"))?;
                match down.recv() {
                    Ok(Message::Release) => Ok(None),
                    Ok(other) => Err(self.failure(op, format!("root sent {}", other.kind()))),
                    Err(_) => Err(self.failure(op, "root is gone")),
                }
            }
        }
    }

    fn broadcast_with<T: Clone>(
        &mut self,
        op: &'static str,
        payload: Option<T>,
        wrap: fn(T) -> Message,
        unwrap: fn(Message) -> std::result::Result<T, Message>,
    ) -> Result<T> {
        match &self.links {
            Links::Root { uplinks, downlinks } => {
                let value = payload.ok_or_else(|| self.failure(op, "root has no payload"))?;
                for (idx, downlink) in downlinks.iter().enumerate() {
                    downlink
                        .send(wrap(value.clone()))
                        .map_err(|_| self.failure(op, format!("rank {} is gone", idx + 1)))?;
                }
                for (idx, uplink) in uplinks.iter().enumerate() {
                    let peer = idx + 1;
                    match uplink.recv() {
                        Ok(Message::Release) => {}
                        Ok(other) => {
                            return Err(
                                self.failure(op, format!("rank {peer} sent {}", other.kind()))
                            );
                        }
                        Err(_) => return Err(self.failure(op, format!("rank {peer} is gone"))),
                    }
                }
                Ok(value)
            }
            Links::Leaf { up, down } => {
                let msg = down.recv().map_err(|_| self.failure(op, "root is gone"))?;
                let value = unwrap(msg)
                    .map_err(|other| self.failure(op, format!("root sent {}", other.kind())))?;
                up.send(Message::Release)
                    .map_err(|_| self.failure(op, "root is gone"))?;
                Ok(value)
            }
        }
    }
}

fn unwrap_word(msg: Message) -> std::result::Result<u64, Message> {
    match msg {
        Message::Word(value) => Ok(value),
        other => Err(other),
    }
}

fn unwrap_bytes(msg: Message) -> std::result::Result<Vec<u8>, Message> {
    match msg {
        Message::Bytes(bytes) => Ok(bytes),
        other => Err(other),
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn gather_word(
        &mut self,
        value: u64,
    ) -> Result<Option<Vec<u64>>> {
        self.gather_with("gather", value, Message::Word, unwrap_word)
    }

    fn gather_bytes(
        &mut self,
        bytes: Vec<u8>,
    ) -> Result<Option<Vec<Vec<u8>>>> {
        self.gather_with("gather", bytes, Message::Bytes, unwrap_bytes)
    }

    fn broadcast_word(
        &mut self,
        value: Option<u64>,
    ) -> Result<u64> {
        self.broadcast_with("broadcast", value, Message::Word, unwrap_word)
    }

    fn broadcast_bytes(
        &mut self,
        bytes: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        self.broadcast_with("broadcast", bytes, Message::Bytes, unwrap_bytes)
    }
}
