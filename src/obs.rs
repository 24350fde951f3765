//! Optional observability helpers for integration flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `hubspot_bridge.flow` with the `flow` and
//!   `stage` (call site) fields, plus the per-object log events of the item fetch.
//! - Enable `metrics` to increment the `hubspot_bridge_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `hubspot_bridge_items_total` counter labeled by `object`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Integration flows observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization URL minting.
	Authorize,
	/// State verification, code exchange, and credential caching.
	Callback,
	/// Read-once credential pickup.
	CredentialRetrieval,
	/// CRM object listing and normalization.
	ItemFetch,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::Callback => "callback",
			FlowKind::CredentialRetrieval => "credential_retrieval",
			FlowKind::ItemFetch => "item_fetch",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an integration flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
