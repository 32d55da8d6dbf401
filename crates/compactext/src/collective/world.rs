//! # World Runner

use crate::collective::channel_comm::ChannelCommunicator;
use crate::collective::Communicator;
use crate::errors::{CompactError, Result};
use std::thread;

/// Run `worker` once per rank, each on its own thread, and join them all.
///
/// Every rank gets its own [`ChannelCommunicator`]; ranks share nothing else.
/// A rank's communicator is dropped when its worker returns, so peers still
/// waiting in a collective fail instead of blocking.
///
/// # Returns
/// The workers' results, indexed by rank.
///
/// # Errors
/// The first failure by rank, preferring a root cause over the
/// [`CompactError::CollectiveFailure`]s it triggered on the other ranks. A
/// panicking worker is reported as a collective failure.
pub fn run_world<T, F>(
    size: usize,
    worker: F,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(ChannelCommunicator) -> Result<T> + Sync,
{
    let comms = ChannelCommunicator::world(size)?;
    log::debug!("starting world of {size} ranks");

    let outcomes: Vec<Result<T>> = thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let worker = &worker;
                let rank = comm.rank();
                (
                    rank,
                    thread::Builder::new()
                        .name(format!("rank-{rank}"))
                        .spawn_scoped(s, move || worker(comm)),
                )
            })
            .collect();

        handles
            .into_iter()
            .map(|(rank, handle)| match handle {
                Ok(handle) => handle.join().unwrap_or_else(|_| {
                    Err(CompactError::collective("run", rank, "worker panicked"))
                }),
                Err(e) => Err(e.into()),
            })
            .collect()
    });

    let mut results = Vec::with_capacity(size);
    let mut first_err: Option<CompactError> = None;
    for outcome in outcomes {
        match outcome {
            Ok(value) => results.push(value),
            Err(err) => {
                first_err = match first_err {
                    Some(prev) if !prev.is_collective() || err.is_collective() => Some(prev),
                    _ => Some(err),
                };
            }
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(results),
    }
}
