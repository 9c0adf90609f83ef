//! Credential validation against the capability endpoint.

// self
use crate::{
	_prelude::*,
	address::ServerAddress,
	auth::Credentials,
	http::ProbeHttpClient,
	obs::{self, ProbeKind, ProbeOutcomeLabel, ProbeSpan},
	probe::{ProbeOutcome, Prober, StatusCategory},
};

/// Caller-side reading of a validation [`ProbeOutcome`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationVerdict {
	/// Credentials were accepted. A `404` counts: the server is reachable and let the
	/// request through, only the probed resource is absent. So does an unfollowed redirect,
	/// which is an answer to the authenticated request rather than a rejection.
	Valid,
	/// Credentials were rejected, or the server answered in a way setup cannot use.
	Invalid,
	/// No response arrived, so nothing is known about the credentials.
	Inconclusive(String),
}
impl ValidationVerdict {
	/// Classifies a validation outcome.
	pub fn classify(outcome: &ProbeOutcome) -> Self {
		match outcome {
			ProbeOutcome::Success(StatusCategory::Ok(_) | StatusCategory::NotFound)
			| ProbeOutcome::Redirect(_) => Self::Valid,
			ProbeOutcome::Success(StatusCategory::Other(_)) | ProbeOutcome::AuthRequired =>
				Self::Invalid,
			ProbeOutcome::NetworkError(reason) => Self::Inconclusive(reason.clone()),
		}
	}

	/// Returns `true` for [`ValidationVerdict::Valid`].
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid)
	}
}

impl<C> Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// Sends exactly one authenticated probe and reports the raw outcome.
	///
	/// Classification is left to the caller (see [`ValidationVerdict::classify`]) and
	/// nothing is retried.
	pub async fn validate(
		&self,
		address: &ServerAddress,
		credentials: &Credentials,
	) -> Result<ProbeOutcome> {
		const KIND: ProbeKind = ProbeKind::Validation;

		let span = ProbeSpan::new(KIND, "validate");

		obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Attempt);

		let result = span.instrument(self.probe(address, Some(credentials))).await;
		let label = match &result {
			Ok(outcome) if ValidationVerdict::classify(outcome).is_valid() =>
				ProbeOutcomeLabel::Success,
			_ => ProbeOutcomeLabel::Failure,
		};

		obs::record_probe_outcome(KIND, label);

		result
	}
}
