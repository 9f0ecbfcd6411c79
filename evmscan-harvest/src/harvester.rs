//! Bulk harvesting with adaptive range bisection.
//!
//! Explorer APIs cap every range query at a page ceiling, and record density
//! over a block interval is unknown in advance. The harvester collects every
//! matching record anyway:
//!
//! 1. A priority queue of pending sub-ranges starts with the full interval,
//!    ordered largest-first so the worst offenders split early.
//! 2. A bounded pool of workers probes each sub-range with a single
//!    first-page call. Fewer records than the ceiling means the sub-range is
//!    exhaustively covered. A full page over more than one block means the
//!    range may be saturated: it is bisected and the partial page discarded,
//!    since the halves re-fetch it, which is what makes the result provably
//!    complete. A full page on a single block falls back to plain pagination
//!    within that block, the only place pagination is safe.
//! 3. Results are deduplicated and totally ordered.
//!
//! A sub-range is therefore always resolved exactly once: covered, split
//! into two queued children, or failed. Failures abort the harvest in strict
//! mode (the default) or are collected per range in lenient mode.
//! Cancellation stops scheduling immediately and returns the partial result
//! behind an error, never as a complete harvest.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use evmscan::error::{Error, ErrorKind};
use evmscan::method::Method;
use evmscan::params::Params;
use evmscan::Client;
use serde_json::Value;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::range::BlockRange;
use crate::record;

/// Default worker-pool size.
const DEFAULT_CONCURRENCY: usize = 4;

/// Default page ceiling, matching the Etherscan family's hard cap.
const DEFAULT_PAGE_SIZE: usize = 10_000;

/// What the harvester does when a sub-range keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Abort the whole harvest on the first failed sub-range.
    #[default]
    Strict,
    /// Record the failure, skip the sub-range, continue.
    Lenient,
}

/// One sub-range the harvest could not cover (lenient mode).
#[derive(Debug)]
pub struct RangeFailure {
    /// The failed sub-range.
    pub range: BlockRange,
    /// Why it failed, after retries.
    pub error: Error,
}

/// The outcome of a completed harvest.
#[derive(Debug, Default)]
pub struct Harvest {
    /// Deduplicated records in (block, transaction index, log index) order.
    pub records: Vec<Value>,
    /// Sub-ranges skipped in lenient mode.
    pub failures: Vec<RangeFailure>,
}

/// Errors terminating a harvest.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Strict-mode abort: one sub-range failed after retries.
    #[error("harvest aborted at range {failed}: {source}")]
    Partial {
        /// Sub-ranges fully covered before the abort.
        completed: Vec<BlockRange>,
        /// The failing sub-range.
        failed: BlockRange,
        /// The failure itself.
        #[source]
        source: Error,
    },
    /// The cancellation token fired; the partial result is attached.
    #[error("harvest canceled")]
    Canceled {
        /// Records and failures gathered before cancellation.
        partial: Harvest,
    },
    /// The harvest could not start or a worker failed structurally.
    #[error(transparent)]
    Client(#[from] Error),
}

/// Collects every record matching an address over a block interval.
#[allow(missing_debug_implementations)] // Client holds dyn trait objects
pub struct Harvester {
    client: Arc<Client>,
    concurrency: usize,
    page_size: usize,
    mode: FailureMode,
    cancel: CancellationToken,
}

impl Harvester {
    /// A harvester over the given client with default settings: four
    /// workers, the Etherscan page ceiling, strict failure handling.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            mode: FailureMode::Strict,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the worker-pool size; at most this many requests are in flight.
    #[must_use]
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    /// Sets the provider's page ceiling.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Switches to lenient failure handling.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.mode = FailureMode::Lenient;
        self
    }

    /// Attaches a cancellation token observed by the whole harvest.
    #[must_use]
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Harvests every record for `address` over `interval`.
    ///
    /// The result equals what one idealized unbounded query would return:
    /// deduplicated, totally ordered, with the processed sub-ranges exactly
    /// partitioning the interval. The harvest keeps no state between calls
    /// and may be restarted freely.
    ///
    /// # Errors
    ///
    /// [`HarvestError::Client`] when the method is not range-scoped or the
    /// address is malformed; [`HarvestError::Partial`] on a strict-mode
    /// abort; [`HarvestError::Canceled`] when the token fires mid-harvest.
    pub async fn collect(
        &self,
        method: Method,
        address: &str,
        interval: BlockRange,
    ) -> Result<Harvest, HarvestError> {
        if !method.is_ranged() {
            return Err(Error::InvalidArgument(format!(
                "{method} does not return block-ranged records"
            ))
            .into());
        }
        validate_address(address)?;

        let cancel = self.cancel.child_token();
        let mut pending: BinaryHeap<Pending> = BinaryHeap::new();
        pending.push(Pending(interval));

        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, BlockRange> = HashMap::new();
        let mut records: Vec<Value> = Vec::new();
        let mut completed: Vec<BlockRange> = Vec::new();
        let mut failures: Vec<RangeFailure> = Vec::new();
        let mut canceled = false;

        loop {
            if cancel.is_cancelled() {
                canceled = true;
            }
            if !canceled {
                while tasks.len() < self.concurrency {
                    let Some(Pending(range)) = pending.pop() else {
                        break;
                    };
                    let client = Arc::clone(&self.client);
                    let address = address.to_owned();
                    let token = cancel.clone();
                    let page_size = self.page_size;
                    let handle = tasks
                        .spawn(async move {
                            fetch(&client, method, &address, range, page_size, &token).await
                        });
                    in_flight.insert(handle.id(), range);
                }
            }

            let Some(joined) = tasks.join_next_with_id().await else {
                break;
            };
            match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    match outcome {
                        Outcome::Covered {
                            range,
                            records: mut batch,
                        } => {
                            tracing::trace!(range = %range, count = batch.len(), "sub-range covered");
                            records.append(&mut batch);
                            completed.push(range);
                        }
                        Outcome::Split(low, high) => {
                            tracing::trace!(low = %low, high = %high, "sub-range split");
                            if !canceled {
                                pending.push(Pending(low));
                                pending.push(Pending(high));
                            }
                        }
                        Outcome::Failed { range, error } => {
                            if error.kind() == ErrorKind::Canceled {
                                canceled = true;
                            } else {
                                match self.mode {
                                    FailureMode::Lenient => {
                                        tracing::warn!(range = %range, error = %error, "skipping failed sub-range");
                                        failures.push(RangeFailure { range, error });
                                    }
                                    FailureMode::Strict => {
                                        cancel.cancel();
                                        drain(&mut tasks, &mut completed).await;
                                        return Err(HarvestError::Partial {
                                            completed,
                                            failed: range,
                                            source: error,
                                        });
                                    }
                                }
                            }
                        }
                    }
                }
                Err(join_error) => {
                    let range = in_flight.remove(&join_error.id()).unwrap_or(interval);
                    let error = Error::Transport {
                        message: format!("harvest worker failed: {join_error}"),
                    };
                    match self.mode {
                        FailureMode::Lenient => failures.push(RangeFailure { range, error }),
                        FailureMode::Strict => {
                            cancel.cancel();
                            drain(&mut tasks, &mut completed).await;
                            return Err(HarvestError::Partial {
                                completed,
                                failed: range,
                                source: error,
                            });
                        }
                    }
                }
            }
        }

        let harvest = Harvest {
            records: record::merge(records, method),
            failures,
        };
        if canceled {
            return Err(HarvestError::Canceled { partial: harvest });
        }
        Ok(harvest)
    }
}

/// Pending sub-ranges order largest-first; ties prefer the lower start.
#[derive(Debug, PartialEq, Eq)]
struct Pending(BlockRange);

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .blocks()
            .cmp(&other.0.blocks())
            .then_with(|| other.0.start().cmp(&self.0.start()))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resolution of one dequeued sub-range.
enum Outcome {
    Covered {
        range: BlockRange,
        records: Vec<Value>,
    },
    Split(BlockRange, BlockRange),
    Failed {
        range: BlockRange,
        error: Error,
    },
}

async fn fetch(
    client: &Client,
    method: Method,
    address: &str,
    range: BlockRange,
    page_size: usize,
    cancel: &CancellationToken,
) -> Outcome {
    let first = match page(client, method, address, range, 1, page_size, cancel).await {
        Ok(batch) => batch,
        Err(error) => return Outcome::Failed { range, error },
    };
    if first.len() < page_size {
        return Outcome::Covered {
            range,
            records: first,
        };
    }
    if let Some((low, high)) = range.split() {
        // Saturated multi-block range. The partial page is discarded: the
        // halves re-fetch everything, which keeps coverage exact.
        return Outcome::Split(low, high);
    }

    // A single block holding at least a full page: page through it.
    let mut all = first;
    let mut number = 2;
    loop {
        match page(client, method, address, range, number, page_size, cancel).await {
            Err(error) => return Outcome::Failed { range, error },
            Ok(batch) => {
                let exhausted = batch.len() < page_size;
                all.extend(batch);
                if exhausted {
                    return Outcome::Covered {
                        range,
                        records: all,
                    };
                }
                number += 1;
            }
        }
    }
}

async fn page(
    client: &Client,
    method: Method,
    address: &str,
    range: BlockRange,
    number: usize,
    page_size: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Value>, Error> {
    let params = Params::new()
        .set("address", address)
        .set("startblock", range.start())
        .set("endblock", range.end())
        .set("page", u64::try_from(number).unwrap_or(u64::MAX))
        .set("offset", u64::try_from(page_size).unwrap_or(u64::MAX))
        .set("sort", "asc");
    let value = client.call_with_cancel(method, params, cancel).await?;
    match value {
        Value::Array(batch) => Ok(batch),
        other => Err(Error::Parse {
            provider: client.provider_name().to_owned(),
            method,
            message: format!("expected an array of records, got {}", kind_of(&other)),
        }),
    }
}

async fn drain(tasks: &mut JoinSet<Outcome>, completed: &mut Vec<BlockRange>) {
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Outcome::Covered { range, .. }) = joined {
            completed.push(range);
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn validate_address(address: &str) -> Result<(), Error> {
    let hex = address.strip_prefix("0x").unwrap_or("");
    if hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "malformed address {address:?}: expected 0x followed by 40 hex digits"
        )))
    }
}
