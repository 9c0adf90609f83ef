// self
use crate::{
	auth::AuthScheme,
	obs::{ProbeKind, ProbeOutcomeLabel},
	probe::ResolutionBasis,
};

/// Counts one stage of a probe operation in `dav_setup_probe_total`.
pub fn record_probe_outcome(kind: ProbeKind, outcome: ProbeOutcomeLabel) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"dav_setup_probe_total",
			"probe" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a followed same-path redirect in `dav_setup_redirect_hops_total`.
pub fn count_redirect_hop() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("dav_setup_redirect_hops_total").increment(1);
	}
}

/// Counts a finished discovery run in `dav_setup_resolution_total`, labeled by the
/// scheme and the basis behind it.
pub fn count_resolution(scheme: AuthScheme, basis: &ResolutionBasis) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"dav_setup_resolution_total",
			"scheme" => scheme.as_str(),
			"basis" => basis.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (scheme, basis);
	}
}
