//! # Integration Metrics
//!
//! Prometheus metrics for the call-on-integration pipeline.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! fv-03-integration-manager = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `integration_calls_total` - Counter of calls entering the pipeline
//! - `integration_calls_committed_total` - Counter of committed calls
//! - `integration_calls_failed_total` - Counter of failed calls (by kind)
//! - `integration_policy_rejections_total` - Counter of rejections (by policy)
//! - `integration_tracked_asset_changes_total` - Counter of tracked set changes (by direction)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Calls entering the pipeline
    pub static ref CALLS: IntCounter = register_int_counter!(
        "integration_calls_total",
        "Total number of call-on-integration requests"
    )
    .expect("Failed to create CALLS metric");

    /// Committed calls
    pub static ref CALLS_COMMITTED: IntCounter = register_int_counter!(
        "integration_calls_committed_total",
        "Total number of committed call-on-integration requests"
    )
    .expect("Failed to create CALLS_COMMITTED metric");

    /// Failed calls, labeled by error kind
    pub static ref CALLS_FAILED: IntCounterVec = register_int_counter_vec!(
        "integration_calls_failed_total",
        "Total number of failed call-on-integration requests",
        &["kind"]
    )
    .expect("Failed to create CALLS_FAILED metric");

    /// Policy rejections, labeled by policy identifier
    pub static ref POLICY_REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "integration_policy_rejections_total",
        "Total number of operations rejected by a policy",
        &["policy"]
    )
    .expect("Failed to create POLICY_REJECTIONS metric");

    /// Tracked asset set changes, labeled by direction
    pub static ref TRACKED_ASSET_CHANGES: IntCounterVec = register_int_counter_vec!(
        "integration_tracked_asset_changes_total",
        "Total number of tracked asset additions and removals",
        &["direction"]
    )
    .expect("Failed to create TRACKED_ASSET_CHANGES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a call entering the pipeline
#[cfg(feature = "metrics")]
pub fn record_call() {
    CALLS.inc();
}

/// Record a committed call
#[cfg(feature = "metrics")]
pub fn record_commit() {
    CALLS_COMMITTED.inc();
}

/// Record a failed call
#[cfg(feature = "metrics")]
pub fn record_failure(kind: &str) {
    CALLS_FAILED.with_label_values(&[kind]).inc();
}

/// Record a policy rejection
#[cfg(feature = "metrics")]
pub fn record_policy_rejection(policy: &str) {
    POLICY_REJECTIONS.with_label_values(&[policy]).inc();
}

/// Record tracked asset additions and removals
#[cfg(feature = "metrics")]
pub fn record_tracked_asset_changes(added: usize, removed: usize) {
    TRACKED_ASSET_CHANGES
        .with_label_values(&["added"])
        .inc_by(added as u64);
    TRACKED_ASSET_CHANGES
        .with_label_values(&["removed"])
        .inc_by(removed as u64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_call() {}

#[cfg(not(feature = "metrics"))]
pub fn record_commit() {}

#[cfg(not(feature = "metrics"))]
pub fn record_failure(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_policy_rejection(_policy: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_tracked_asset_changes(_added: usize, _removed: usize) {}
