//! Server probes: the transport probe plus the discovery, validation, status, and folder
//! operations built on it.
//!
//! [`Prober`] owns the HTTP transport and the [`ProbePolicy`]. Every operation is an
//! `async fn` that issues its requests strictly one after another, so a single run
//! never has more than one request in flight. Dropping an operation's future cancels
//! it: the in-flight request is dropped with it and nothing is reported.

pub mod discovery;
pub mod folder;
pub mod status;
pub mod validation;

pub use discovery::*;
pub use folder::*;
pub use status::*;
pub use validation::*;

// self
use crate::{
	_prelude::*,
	address::ServerAddress,
	auth::Credentials,
	error::ConfigError,
	http::{ProbeHttpClient, ProbeMethod, ProbeRequest, ProbeResponse},
	policy::ProbePolicy,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestProbeClient;

#[cfg(feature = "reqwest")]
/// Prober specialized for the crate's default reqwest transport.
pub type ReqwestProber = Prober<ReqwestProbeClient>;

/// Status seen on a response that was neither an auth challenge nor a followable redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
	/// Any `2xx` status.
	Ok(u16),
	/// `404`: the server is reachable but the probed resource is absent.
	NotFound,
	/// Any other status, including a `3xx` without a usable location.
	Other(u16),
}
impl StatusCategory {
	/// Categorizes a status that is not an auth challenge or redirect.
	pub fn from_status(status: u16) -> Self {
		match status {
			200..=299 => Self::Ok(status),
			404 => Self::NotFound,
			_ => Self::Other(status),
		}
	}
}

/// Result of one probe.
///
/// Only status and redirect metadata survive; response bodies are never kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
	/// The server answered without challenging or redirecting.
	Success(StatusCategory),
	/// The server answered `401` or `403`.
	AuthRequired,
	/// The server answered `3xx` with a location, resolved against the request URL.
	Redirect(Url),
	/// No HTTP response arrived (DNS, TCP, TLS, timeout).
	NetworkError(String),
}
impl ProbeOutcome {
	/// Maps an HTTP response to an outcome using only its status and `Location` header.
	pub fn from_response(request_url: &Url, status: u16, location: Option<&str>) -> Self {
		match status {
			401 | 403 => Self::AuthRequired,
			300..=399 => match location.and_then(|raw| resolve_location(request_url, raw)) {
				Some(target) => Self::Redirect(target),
				None => Self::Success(StatusCategory::Other(status)),
			},
			_ => Self::Success(StatusCategory::from_status(status)),
		}
	}

	/// Returns the redirect target, if any.
	pub fn redirect_target(&self) -> Option<&Url> {
		match self {
			Self::Redirect(target) => Some(target),
			_ => None,
		}
	}
}

/// Issues server probes against one transport with one policy.
///
/// The prober is cheap to clone and holds no per-run state: discovery keeps its
/// [`AuthProbeState`] on the stack of the running future.
#[derive(Clone)]
pub struct Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// HTTP client used for every outbound probe.
	pub http_client: Arc<C>,
	policy: ProbePolicy,
}
impl<C> Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// Creates a prober from a transport and a policy assumed to be valid.
	///
	/// Use [`Prober::with_policy`] for policies loaded from configuration.
	pub fn new(http_client: impl Into<Arc<C>>, policy: ProbePolicy) -> Self {
		Self { http_client: http_client.into(), policy }
	}

	/// Creates a prober after validating `policy`.
	pub fn with_policy(http_client: impl Into<Arc<C>>, policy: ProbePolicy) -> Result<Self> {
		policy.validate().map_err(ConfigError::from)?;

		Ok(Self::new(http_client, policy))
	}

	/// Returns the active policy.
	pub fn policy(&self) -> &ProbePolicy {
		&self.policy
	}

	/// Resolves the capability endpoint beneath `address`.
	pub fn capability_url(&self, address: &ServerAddress) -> Result<Url> {
		Ok(address.endpoint(&self.policy.capability_path)?)
	}

	/// Probes the capability endpoint of `address`.
	///
	/// Without credentials no `Authorization` header is sent, which is what makes servers
	/// that require a login answer with a challenge.
	pub async fn probe(
		&self,
		address: &ServerAddress,
		credentials: Option<&Credentials>,
	) -> Result<ProbeOutcome> {
		let url = self.capability_url(address)?;

		Ok(self.probe_url(&url, credentials).await)
	}

	/// Probes an already resolved URL, such as a redirect target.
	pub async fn probe_url(&self, url: &Url, credentials: Option<&Credentials>) -> ProbeOutcome {
		match self.send(request(ProbeMethod::Get, url, credentials)).await {
			Ok(response) =>
				ProbeOutcome::from_response(url, response.status, response.location.as_deref()),
			Err(reason) => ProbeOutcome::NetworkError(reason),
		}
	}

	/// Sends one request, flattening transport failures into their description.
	pub(crate) async fn send(&self, request: ProbeRequest) -> Result<ProbeResponse, String> {
		<C as ProbeHttpClient>::execute(self.http_client.as_ref(), request)
			.await
			.map_err(|err| describe_transport_error(&err))
	}
}
#[cfg(feature = "reqwest")]
impl Prober<ReqwestProbeClient> {
	/// Creates a prober with its own reqwest transport and the default policy.
	pub fn reqwest() -> Result<Self> {
		let client = ReqwestProbeClient::new()?;

		Ok(Self::new(client, ProbePolicy::default()))
	}
}
impl<C> Debug for Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Prober").field("policy", &self.policy).finish()
	}
}

/// Builds a request carrying the Basic `Authorization` value of `credentials`, if any.
pub(crate) fn request(
	method: ProbeMethod,
	url: &Url,
	credentials: Option<&Credentials>,
) -> ProbeRequest {
	ProbeRequest::new(method, url.clone())
		.with_authorization(credentials.map(Credentials::basic_authorization))
}

fn resolve_location(request_url: &Url, raw: &str) -> Option<Url> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}

	request_url.join(raw).ok()
}

fn describe_transport_error(err: &dyn StdError) -> String {
	let mut description = err.to_string();
	let mut source = err.source();

	while let Some(cause) = source {
		description.push_str(": ");
		description.push_str(&cause.to_string());
		source = cause.source();
	}

	description
}
