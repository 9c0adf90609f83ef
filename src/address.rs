//! Validated server addresses derived from user input.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::ConfigError};

/// Error returned when user input cannot be turned into a [`ServerAddress`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AddressError {
	/// The input was empty or whitespace.
	#[error("Server address cannot be empty.")]
	Empty,
	/// The input named a scheme other than `http` or `https`.
	#[error("Server address uses unsupported scheme `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme found in the input.
		scheme: String,
	},
	/// The input could not be parsed as a URL.
	#[error("Server address `{input}` is not a valid URL.")]
	Malformed {
		/// Input after trimming and scheme defaulting.
		input: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The URL has no host component.
	#[error("Server address `{input}` has no host.")]
	MissingHost {
		/// Input after trimming and scheme defaulting.
		input: String,
	},
}

/// Absolute `http`/`https` base URL of a server.
///
/// Input without a scheme defaults to `https`. The base path always ends in `/` so
/// relative endpoint paths such as `remote.php/webdav/` join beneath it instead of
/// replacing its last segment. Query and fragment are discarded.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerAddress(Url);
impl ServerAddress {
	/// Parses user input, defaulting the scheme to `https` when none is given.
	pub fn new(input: impl AsRef<str>) -> Result<Self, AddressError> {
		let trimmed = input.as_ref().trim();

		if trimmed.is_empty() {
			return Err(AddressError::Empty);
		}

		let lowered = trimmed.to_ascii_lowercase();
		let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
			trimmed.to_owned()
		} else if let Some((scheme, _)) = trimmed.split_once("://") {
			return Err(AddressError::UnsupportedScheme { scheme: scheme.to_owned() });
		} else {
			format!("https://{trimmed}")
		};
		let url = Url::parse(&candidate)
			.map_err(|source| AddressError::Malformed { input: candidate.clone(), source })?;

		Self::from_url(url).ok_or(AddressError::MissingHost { input: candidate })
	}

	/// Recovers the server base from a full endpoint URL ending in `endpoint_path`.
	///
	/// Returns `None` when the URL does not end with the endpoint path or is not an
	/// `http`/`https` URL.
	pub fn from_endpoint(endpoint: &Url, endpoint_path: &str) -> Option<Self> {
		let base = endpoint.path().strip_suffix(endpoint_path)?;
		let mut url = endpoint.clone();

		url.set_path(base);

		Self::from_url(url)
	}

	/// Joins a relative endpoint path onto the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.0
			.join(path)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}

	/// Returns the base URL.
	pub fn as_url(&self) -> &Url {
		&self.0
	}

	/// Returns `true` when the address uses TLS.
	pub fn is_secure(&self) -> bool {
		self.0.scheme() == "https"
	}

	fn from_url(mut url: Url) -> Option<Self> {
		if !matches!(url.scheme(), "http" | "https") {
			return None;
		}
		if url.host_str().is_none_or(str::is_empty) {
			return None;
		}

		url.set_query(None);
		url.set_fragment(None);

		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());

			url.set_path(&path);
		}

		Some(Self(url))
	}
}
impl Deref for ServerAddress {
	type Target = Url;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ServerAddress {
	fn as_ref(&self) -> &str {
		self.0.as_str()
	}
}
impl From<ServerAddress> for String {
	fn from(value: ServerAddress) -> Self {
		value.0.into()
	}
}
impl TryFrom<String> for ServerAddress {
	type Error = AddressError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ServerAddress {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for ServerAddress {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ServerAddress({})", self.0)
	}
}
impl Display for ServerAddress {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.0.as_str())
	}
}
