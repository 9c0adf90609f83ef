//! Observability for server probes.
//!
//! Every probe operation reports an attempt and then a success or failure. Discovery also
//! reports each followed redirect hop and the basis its run resolved on, so dashboards
//! can tell confirmed schemes from fallbacks.
//!
//! # Feature Flags
//!
//! - `tracing`: `dav_setup.probe` spans carrying `probe` and `stage`. Hops are logged at
//!   `debug`, fallback classifications at `warn`, resolutions at `debug`.
//! - `metrics`: counters `dav_setup_probe_total{probe, outcome}`,
//!   `dav_setup_redirect_hops_total`, and `dav_setup_resolution_total{scheme, basis}`.
//!
//! Without either feature every helper compiles to nothing.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, probe::Resolution};

/// Probe operation a span or counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeKind {
	/// Authentication scheme discovery.
	Discovery,
	/// Credential validation.
	Validation,
	/// Server status document check.
	ServerStatus,
	/// Remote folder check or creation.
	RemoteFolder,
}
impl ProbeKind {
	/// Label used for the `probe` span field and metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProbeKind::Discovery => "discovery",
			ProbeKind::Validation => "validation",
			ProbeKind::ServerStatus => "server_status",
			ProbeKind::RemoteFolder => "remote_folder",
		}
	}
}
impl Display for ProbeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stage of a probe operation, as counted by `dav_setup_probe_total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeOutcomeLabel {
	/// The operation started.
	Attempt,
	/// The operation produced a usable answer. For validation this means the
	/// credentials were accepted.
	Success,
	/// The operation returned an error or rejected credentials.
	Failure,
}
impl ProbeOutcomeLabel {
	/// Label used for the `outcome` metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProbeOutcomeLabel::Attempt => "attempt",
			ProbeOutcomeLabel::Success => "success",
			ProbeOutcomeLabel::Failure => "failure",
		}
	}
}
impl Display for ProbeOutcomeLabel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a followed same-path redirect hop.
pub fn record_redirect_hop(hop: u32, target: &Url) {
	log_redirect_hop(hop, target);
	count_redirect_hop();
}

/// Records the scheme and basis a discovery run settled on.
pub fn record_resolution(resolution: &Resolution) {
	log_resolution(resolution);
	count_resolution(resolution.scheme, &resolution.basis);
}
