//! Tracing-backed telemetry sink.

use evmscan::ports::{CallEvent, CallOutcome, Telemetry};

/// [`Telemetry`] sink emitting one structured `tracing` event per call.
///
/// The field set is stable: provider, chain id, method, outcome, error kind
/// (failures only), HTTP status, and duration in milliseconds. Successes
/// and cache hits log at debug, failures at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn record(&self, event: &CallEvent<'_>) {
        let duration_ms = u64::try_from(event.duration.as_millis()).unwrap_or(u64::MAX);
        match event.outcome {
            CallOutcome::Failure(kind) => {
                tracing::warn!(
                    target: "evmscan",
                    provider = event.provider,
                    chain_id = event.chain_id,
                    method = %event.method,
                    outcome = event.outcome.as_str(),
                    error_kind = kind.as_str(),
                    status = event.status,
                    duration_ms,
                    "explorer call failed"
                );
            }
            CallOutcome::Success | CallOutcome::CacheHit => {
                tracing::debug!(
                    target: "evmscan",
                    provider = event.provider,
                    chain_id = event.chain_id,
                    method = %event.method,
                    outcome = event.outcome.as_str(),
                    status = event.status,
                    duration_ms,
                    "explorer call"
                );
            }
        }
    }
}
