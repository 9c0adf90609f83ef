//! Authentication scheme discovery across redirect chains.
//!
//! [`Prober::discover`] probes the capability endpoint without credentials and
//! classifies the answer:
//!
//! - a `401`/`403` challenge, or any answer without a redirect, means plain HTTP
//!   credentials;
//! - a redirect whose target still ends with the capability path means the endpoint
//!   moved, so the target is probed again (at most [`ProbePolicy::max_redirects`]
//!   times, after which the redirect is ignored);
//! - any other redirect is searched for a federation marker (`SAML`, `wayf`, ignoring
//!   case). A hit selects federated login; a miss falls back to HTTP credentials and
//!   the [`Resolution`] records that the answer was a fallback.
//!
//! A transport failure ends the run with [`Error::Unreachable`].

// self
use crate::{
	_prelude::*,
	address::ServerAddress,
	auth::AuthScheme,
	error::ConfigError,
	http::ProbeHttpClient,
	obs::{self, ProbeKind, ProbeOutcomeLabel, ProbeSpan},
	policy::ProbePolicy,
	probe::{ProbeOutcome, Prober},
};

/// Mutable state carried across one discovery run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthProbeState {
	/// Same-path redirect hops followed so far.
	pub redirect_count: u32,
	/// Capability URL probed next.
	pub current_url: Url,
}
impl AuthProbeState {
	/// Starts a run at `url` with no redirects recorded.
	pub fn new(url: Url) -> Self {
		Self { redirect_count: 0, current_url: url }
	}

	/// Classifies one probe outcome, advancing the state on a followed redirect.
	pub fn advance(&mut self, outcome: ProbeOutcome, policy: &ProbePolicy) -> DiscoveryStep {
		let target = match outcome {
			ProbeOutcome::NetworkError(reason) => return DiscoveryStep::Failed { reason },
			ProbeOutcome::AuthRequired =>
				return DiscoveryStep::Resolved(AuthScheme::HttpCredentials, ResolutionBasis::Challenge),
			ProbeOutcome::Success(_) =>
				return DiscoveryStep::Resolved(AuthScheme::HttpCredentials, ResolutionBasis::NoRedirect),
			ProbeOutcome::Redirect(target) => target,
		};

		if self.redirect_count >= policy.max_redirects {
			obs::log_fallback(ResolutionBasis::RedirectBoundExceeded.as_str(), &target);

			return DiscoveryStep::Resolved(
				AuthScheme::HttpCredentials,
				ResolutionBasis::RedirectBoundExceeded,
			);
		}
		if target.as_str().ends_with(&policy.capability_path) {
			self.redirect_count += 1;

			obs::record_redirect_hop(self.redirect_count, &target);

			self.current_url = target;

			return DiscoveryStep::Redirected;
		}
		if let Some(marker) = policy.federation_marker(target.as_str()) {
			return DiscoveryStep::Resolved(
				AuthScheme::FederatedRedirect,
				ResolutionBasis::FederationMarker { marker: marker.to_owned(), target },
			);
		}

		// Unrecognized login redirects keep the basic-credential default.
		obs::log_fallback("unrecognized_redirect", &target);

		DiscoveryStep::Resolved(
			AuthScheme::HttpCredentials,
			ResolutionBasis::UnrecognizedRedirect { target },
		)
	}
}

/// Transition produced by [`AuthProbeState::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscoveryStep {
	/// A same-path redirect was followed; probe [`AuthProbeState::current_url`] next.
	Redirected,
	/// The run is over with a scheme.
	Resolved(AuthScheme, ResolutionBasis),
	/// The run is over without a scheme because no response arrived.
	Failed {
		/// Transport-supplied description.
		reason: String,
	},
}

/// Why discovery settled on its scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionBasis {
	/// The server challenged the unauthenticated probe.
	Challenge,
	/// The server answered without a redirect.
	NoRedirect,
	/// Same-path redirects exceeded the bound; the last one was ignored.
	RedirectBoundExceeded,
	/// The redirect target contained a federation marker.
	FederationMarker {
		/// Marker that matched.
		marker: String,
		/// Redirect target.
		target: Url,
	},
	/// The redirect target matched nothing known.
	UnrecognizedRedirect {
		/// Redirect target.
		target: Url,
	},
}
impl ResolutionBasis {
	/// Label used for log fields and the `basis` metric label.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Challenge => "challenge",
			Self::NoRedirect => "no_redirect",
			Self::RedirectBoundExceeded => "redirect_bound_exceeded",
			Self::FederationMarker { .. } => "federation_marker",
			Self::UnrecognizedRedirect { .. } => "unrecognized_redirect",
		}
	}

	/// Returns `true` when the scheme is a default rather than a confirmed answer.
	pub fn is_fallback(&self) -> bool {
		matches!(self, Self::RedirectBoundExceeded | Self::UnrecognizedRedirect { .. })
	}
}

/// Terminal record of a successful discovery run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
	/// Scheme the setup flow should collect credentials for.
	pub scheme: AuthScheme,
	/// Evidence behind the scheme.
	pub basis: ResolutionBasis,
	/// Same-path redirect hops followed.
	pub redirect_count: u32,
	/// Capability URL that produced the final answer.
	pub final_url: Url,
}
impl Resolution {
	/// Returns `true` when the scheme is a default rather than a confirmed answer.
	pub fn is_fallback(&self) -> bool {
		self.basis.is_fallback()
	}

	/// Server base the endpoint settled on after same-path redirects.
	///
	/// Returns `None` when the final URL no longer ends with `capability_path`.
	pub fn effective_address(&self, capability_path: &str) -> Option<ServerAddress> {
		ServerAddress::from_endpoint(&self.final_url, capability_path)
	}
}

impl<C> Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// Discovers the authentication scheme of the server at `address`.
	pub async fn discover(&self, address: &ServerAddress) -> Result<Resolution> {
		const KIND: ProbeKind = ProbeKind::Discovery;

		let span = ProbeSpan::new(KIND, "discover");

		obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Attempt);

		let result = span
			.instrument(async move {
				let mut state = AuthProbeState::new(self.capability_url(address)?);

				loop {
					let outcome = self.probe_url(&state.current_url, None).await;
					let probed = state.current_url.clone();

					match state.advance(outcome, self.policy()) {
						DiscoveryStep::Redirected => continue,
						DiscoveryStep::Resolved(scheme, basis) => {
							let resolution = Resolution {
								scheme,
								basis,
								redirect_count: state.redirect_count,
								final_url: probed,
							};

							obs::record_resolution(&resolution);

							return Ok(resolution);
						},
						DiscoveryStep::Failed { reason } =>
							return Err(Error::Unreachable { url: probed.to_string(), reason }),
					}
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Success),
			Err(_) => obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Failure),
		}

		result
	}

	/// Parses user input into a [`ServerAddress`] and discovers its scheme.
	pub async fn discover_input(&self, input: &str) -> Result<(ServerAddress, Resolution)> {
		let address = ServerAddress::new(input).map_err(ConfigError::from)?;
		let resolution = self.discover(&address).await?;

		Ok((address, resolution))
	}
}
