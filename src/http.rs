//! Transport primitives for server probes.
//!
//! The module exposes [`ProbeHttpClient`] alongside the owned [`ProbeRequest`] and
//! [`ProbeResponse`] values so callers can plug in any HTTP stack. Implementations
//! must never follow redirects on their own: discovery inspects every `3xx` answer
//! and decides whether to follow it, so the `Location` header has to reach the
//! prober untouched.

// std
#[cfg(feature = "reqwest")] use std::{ops::Deref, time::Duration};
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method,
	header::{AUTHORIZATION, HeaderValue, LOCATION},
	redirect::Policy,
};
// self
use crate::{_prelude::*, auth::Secret};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`ProbeHttpClient::execute`].
pub type ProbeFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ProbeResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing server probes.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can back several probers, and the futures
/// they return must be `Send`. Dropping a returned future must abort the request.
pub trait ProbeHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport (DNS, TCP, TLS, timeout).
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends one request and reports the status and `Location` header, plus the body
	/// when [`ProbeRequest::read_body`] is set.
	///
	/// Any HTTP response, whatever its status, is an `Ok` value. `Err` is reserved for
	/// failures where no response arrived, or where a requested body could not be read.
	fn execute(&self, request: ProbeRequest) -> ProbeFuture<'_, Self::TransportError>;
}

/// HTTP methods issued by probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
	/// Plain `GET`, used for discovery, validation, and the status document.
	Get,
	/// WebDAV `PROPFIND` with `Depth: 0`, used to check a remote folder.
	Propfind,
	/// WebDAV `MKCOL`, used to create a remote folder.
	Mkcol,
}
impl ProbeMethod {
	/// Returns the wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProbeMethod::Get => "GET",
			ProbeMethod::Propfind => "PROPFIND",
			ProbeMethod::Mkcol => "MKCOL",
		}
	}
}
impl Display for ProbeMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Owned description of one outbound probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeRequest {
	/// Method to send.
	pub method: ProbeMethod,
	/// Fully resolved target URL.
	pub url: Url,
	/// `Authorization` header value; `None` sends the request unauthenticated.
	pub authorization: Option<Secret>,
	/// Whether the caller needs the response body. Probes that classify on status and
	/// `Location` alone leave it unread, so a broken body cannot hide the status.
	pub read_body: bool,
}
impl ProbeRequest {
	/// Creates an unauthenticated request.
	pub fn new(method: ProbeMethod, url: Url) -> Self {
		Self { method, url, authorization: None, read_body: false }
	}

	/// Asks the transport to read the response body.
	pub fn with_body_read(mut self) -> Self {
		self.read_body = true;

		self
	}

	/// Attaches an `Authorization` header value.
	pub fn with_authorization(mut self, authorization: Option<Secret>) -> Self {
		self.authorization = authorization;

		self
	}
}

/// Metadata and body captured from an HTTP response.
///
/// Additional fields may be added in future releases, so downstream code should
/// construct values through [`ProbeResponse::new`] and the `with_*` helpers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw `Location` header, if present and valid UTF-8.
	pub location: Option<String>,
	/// Response body; empty unless the request set [`ProbeRequest::read_body`].
	pub body: Vec<u8>,
}
impl ProbeResponse {
	/// Creates a response carrying only a status code.
	pub fn new(status: u16) -> Self {
		Self { status, ..Default::default() }
	}

	/// Sets the `Location` header.
	pub fn with_location(mut self, location: impl Into<String>) -> Self {
		self.location = Some(location.into());

		self
	}

	/// Sets the body.
	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = body;

		self
	}
}

/// Thin wrapper around [`ReqwestClient`] configured for probing.
///
/// Probe clients must not follow redirects. [`ReqwestProbeClient::new`] and
/// [`ReqwestProbeClient::with_timeout`] disable redirect following; configure any
/// client passed to [`ReqwestProbeClient::with_client`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestProbeClient {
	client: ReqwestClient,
	methods: WebDavMethods,
}
#[cfg(feature = "reqwest")]
impl ReqwestProbeClient {
	/// Builds a client with redirects disabled and no request timeout.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Self::with_client(client)
	}

	/// Builds a client with redirects disabled and a per-request timeout.
	///
	/// An elapsed timeout surfaces as a transport error, like any other network failure.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).timeout(timeout).build()?;

		Self::with_client(client)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Result<Self, ConfigError> {
		Ok(Self { client, methods: WebDavMethods::new()? })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestProbeClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestProbeClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl ProbeHttpClient for ReqwestProbeClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: ProbeRequest) -> ProbeFuture<'_, Self::TransportError> {
		let client = self.client.clone();
		let method = self.methods.resolve(request.method);

		Box::pin(async move {
			let mut builder = client.request(method, request.url);

			if let Some(mut value) =
				request.authorization.and_then(|secret| HeaderValue::from_str(secret.expose()).ok())
			{
				value.set_sensitive(true);
				builder = builder.header(AUTHORIZATION, value);
			}
			if matches!(request.method, ProbeMethod::Propfind) {
				builder = builder.header("depth", "0");
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let location = response
				.headers()
				.get(LOCATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			// Dropping an unread response abandons its body.
			let body =
				if request.read_body { response.bytes().await?.to_vec() } else { Vec::new() };

			Ok(ProbeResponse { status, location, body })
		})
	}
}

/// WebDAV extension methods, parsed once per client.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
struct WebDavMethods {
	propfind: Method,
	mkcol: Method,
}
#[cfg(feature = "reqwest")]
impl WebDavMethods {
	fn new() -> Result<Self, ConfigError> {
		let parse =
			|name: &[u8]| Method::from_bytes(name).map_err(ConfigError::http_client_build);

		Ok(Self { propfind: parse(b"PROPFIND")?, mkcol: parse(b"MKCOL")? })
	}

	fn resolve(&self, method: ProbeMethod) -> Method {
		match method {
			ProbeMethod::Get => Method::GET,
			ProbeMethod::Propfind => self.propfind.clone(),
			ProbeMethod::Mkcol => self.mkcol.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_builder_attaches_authorization() {
		let url = Url::parse("https://example.com/remote.php/webdav/")
			.expect("Request fixture should parse.");
		let request = ProbeRequest::new(ProbeMethod::Get, url)
			.with_authorization(Some(Secret::new("Basic abc")));

		assert_eq!(request.authorization.as_ref().map(Secret::expose), Some("Basic abc"));
		assert!(!format!("{request:?}").contains("Basic abc"));
	}

	#[test]
	fn only_requests_that_ask_read_the_body() {
		let url = Url::parse("https://example.com/status.php").expect("Request fixture should parse.");

		assert!(!ProbeRequest::new(ProbeMethod::Get, url.clone()).read_body);
		assert!(ProbeRequest::new(ProbeMethod::Get, url).with_body_read().read_body);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn webdav_methods_map_to_extension_methods() {
		let methods = WebDavMethods::new().expect("WebDAV method names should parse.");

		assert_eq!(methods.resolve(ProbeMethod::Propfind).as_str(), "PROPFIND");
		assert_eq!(methods.resolve(ProbeMethod::Mkcol).as_str(), "MKCOL");
		assert_eq!(methods.resolve(ProbeMethod::Get), Method::GET);
	}
}
