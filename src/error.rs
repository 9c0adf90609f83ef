//! Crate-level error types shared across probes, sessions, and transports.
//!
//! Transport failures never surface as a distinct type: probes fold them into
//! [`Error::Unreachable`] with the transport's description.

// self
use crate::{_prelude::*, address::AddressError, policy::PolicyError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Server could not be reached; the probe never produced an HTTP response.
	#[error("Failed to connect to {url}: {reason}.")]
	Unreachable {
		/// URL that was being probed.
		url: String,
		/// Transport-supplied description.
		reason: String,
	},
	/// Server answered but does not look like an installed instance.
	#[error("No server instance found at {url}: {reason}.")]
	NotAnInstance {
		/// URL of the status document.
		url: String,
		/// Why the answer was rejected.
		reason: String,
	},
	/// Server status document could not be parsed.
	#[error("Server status document is malformed.")]
	StatusDocument {
		/// Structured parsing failure, including the failing field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Server rejected the supplied credentials.
	#[error("Server rejected the supplied credentials with HTTP {status}.")]
	InvalidCredentials {
		/// HTTP status code returned by the server.
		status: u16,
	},
	/// Server answered with a status the operation does not accept.
	#[error("{url} answered with unexpected HTTP status {status}.")]
	UnexpectedStatus {
		/// URL that was requested.
		url: String,
		/// HTTP status code returned by the server.
		status: u16,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// User-supplied server address is unusable.
	#[error(transparent)]
	InvalidAddress(#[from] AddressError),
	/// Probe policy failed validation.
	#[error(transparent)]
	InvalidPolicy(#[from] PolicyError),
	/// Endpoint URL could not be derived from the server address.
	#[error("Endpoint `{path}` cannot be joined onto the server address.")]
	InvalidEndpoint {
		/// Relative path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Remote folder is missing and no folder name was configured.
	#[error("No remote folder specified.")]
	MissingRemoteFolder,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
