// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"hubspot_bridge_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts normalized items per CRM object collection (when enabled).
pub fn record_items_fetched(object: &'static str, count: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("hubspot_bridge_items_total", "object" => object)
			.increment(u64::try_from(count).unwrap_or(u64::MAX));
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (object, count);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_callable_without_a_global_recorder() {
		record_flow_outcome(FlowKind::Callback, FlowOutcome::Failure);
		record_items_fetched("contacts", 3);
	}
}
