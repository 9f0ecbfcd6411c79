#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Bulk record harvesting for the `evmscan` explorer client.
//!
//! Explorer providers cap range queries at a hard page ceiling (typically
//! 10,000 rows), so "give me every transaction of this address between
//! blocks a and b" cannot be answered with one call. The [`Harvester`]
//! answers it anyway: it probes block sub-ranges through a bounded worker
//! pool, recursively bisects any sub-range that saturates the ceiling, pages
//! within single blocks that overflow it, and merges everything into one
//! deduplicated, totally ordered record set.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use evmscan::Method;
//! use evmscan_harvest::{BlockRange, Harvester};
//! use std::sync::Arc;
//!
//! let client = Arc::new(evmscan_http::connect("etherscan", "v2", 1_u64, Some("KEY"))?);
//! let harvest = Harvester::new(client)
//!     .concurrency(8)
//!     .collect(
//!         Method::AccountTransactions,
//!         "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
//!         BlockRange::new(0, 20_000_000)?,
//!     )
//!     .await?;
//! println!("{} transactions", harvest.records.len());
//! # Ok(())
//! # }
//! ```

pub mod harvester;
pub mod range;

mod record;

pub use harvester::{FailureMode, Harvest, HarvestError, Harvester, RangeFailure};
pub use range::BlockRange;
