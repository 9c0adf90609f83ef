// self
use crate::{_prelude::*, obs::ProbeKind, probe::Resolution};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedProbe<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedProbe<F> = F;

/// A span builder used by probe operations.
#[derive(Clone, Debug)]
pub struct ProbeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ProbeSpan {
	/// Creates a new span tagged with the provided probe kind + stage.
	pub fn new(kind: ProbeKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("dav_setup.probe", probe = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedProbe<Fut>
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

/// Logs a followed same-path redirect hop.
pub fn log_redirect_hop(hop: u32, target: &Url) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(hop, target = %target, "following capability redirect");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (hop, target);
	}
}

/// Logs a classification that fell back to a default instead of a confirmed answer.
pub fn log_fallback(reason: &'static str, target: &Url) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(reason, target = %target, "auth scheme defaulted to http credentials");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reason, target);
	}
}

/// Logs the scheme a discovery run settled on.
pub fn log_resolution(resolution: &Resolution) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			scheme = resolution.scheme.as_str(),
			basis = resolution.basis.as_str(),
			redirects = resolution.redirect_count,
			final_url = %resolution.final_url,
			"auth scheme resolved"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = resolution;
	}
}
