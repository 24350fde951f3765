// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by integration flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("hubspot_bridge.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`FlowSpan::entered`].
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}

/// Logs a failed flow with its client-facing status.
pub fn log_flow_failure(kind: FlowKind, err: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(flow = kind.as_str(), status = err.status_code(), error = %err, "flow failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, err);
	}
}

/// Logs the start of a CRM object query.
pub fn log_object_query(object: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(object, "querying HubSpot objects");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = object;
	}
}

/// Logs how many objects a CRM query returned.
pub fn log_objects_found(object: &'static str, count: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(object, count, "found HubSpot objects");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (object, count);
	}
}

/// Logs a CRM query that answered with a non-200 status; the collection is skipped.
pub fn log_object_rejected(
	object: &'static str,
	status: Option<u16>,
	retry_after: Option<Duration>,
	body: &str,
) {
	#[cfg(feature = "tracing")]
	{
		let retry_after_secs = retry_after.map(|delay| delay.whole_seconds());

		match status {
			Some(403) => tracing::warn!(
				object,
				status,
				body,
				"HubSpot denied access; check that the app was granted the matching read scope"
			),
			Some(429) => tracing::warn!(
				object,
				status,
				retry_after_secs,
				body,
				"HubSpot rate limit hit; skipping collection"
			),
			_ => tracing::warn!(object, status, body, "HubSpot query failed; skipping collection"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (object, status, retry_after, body);
	}
}

/// Logs the total number of items produced by an item fetch.
pub fn log_fetch_summary(total: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(total, "fetched HubSpot items");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = total;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flow_span_noop_without_subscriber() {
		let _guard = FlowSpan::new(FlowKind::Authorize, "test").entered();

		log_object_rejected("contacts", Some(403), None, "{}");
		log_object_rejected("deals", Some(429), Some(Duration::seconds(10)), "{}");
		log_flow_failure(FlowKind::Callback, &Error::StateMismatch);
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::ItemFetch, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
