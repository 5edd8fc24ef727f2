//! Audit-trail sink.
//!
//! Finalization and other user-visible mutations emit an activity event:
//! a short description plus a structured detail map. The default sink
//! forwards events to `tracing`; hosts that keep their own audit table can
//! plug in a different implementation.

use serde_json::Value;
use tracing::info;

pub trait ActivityLog {
    fn record(
        &self,
        description: &str,
        details: Value,
    );
}

/// Forwards activity events to the `tracing` pipeline at INFO level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn record(
        &self,
        description: &str,
        details: Value,
    ) {
        info!(%details, "{description}");
    }
}
