//! Server status document check performed before discovery.
//!
//! Servers publish an unauthenticated `status.php` JSON document. Older releases encode
//! the `installed` flag as the string `"true"`; both encodings are accepted.

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	address::ServerAddress,
	http::{ProbeHttpClient, ProbeMethod},
	obs::{self, ProbeKind, ProbeOutcomeLabel, ProbeSpan},
	probe::{self, Prober},
};

/// Parsed server status document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
	/// Whether the server finished its installation.
	#[serde(deserialize_with = "flexible_bool")]
	pub installed: bool,
	/// Whether the server is in maintenance mode.
	#[serde(default, deserialize_with = "flexible_bool")]
	pub maintenance: bool,
	/// Numeric version, e.g. `10.0.3.3`.
	#[serde(default)]
	pub version: String,
	/// Human-readable version, e.g. `10.0.3`.
	#[serde(default, rename = "versionstring")]
	pub version_string: String,
	/// Edition label; often empty.
	#[serde(default)]
	pub edition: String,
	/// Product name, when the server reports one.
	#[serde(default, rename = "productname")]
	pub product_name: Option<String>,
}
impl ServerStatus {
	/// Parses a status document, reporting the failing field path on error.
	pub fn from_slice(body: &[u8]) -> Result<Self> {
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::StatusDocument { source })
	}

	/// Version to show users: the human-readable string when present, else the number.
	pub fn display_version(&self) -> &str {
		if self.version_string.is_empty() { &self.version } else { &self.version_string }
	}
}

impl<C> Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// Reads the status document of `address` and checks that the server is installed.
	pub async fn check_server(&self, address: &ServerAddress) -> Result<ServerStatus> {
		const KIND: ProbeKind = ProbeKind::ServerStatus;

		let span = ProbeSpan::new(KIND, "check_server");

		obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Attempt);

		let result = span
			.instrument(async move {
				let url = address.endpoint(&self.policy().status_path)?;
				let response = self
					.send(probe::request(ProbeMethod::Get, &url, None).with_body_read())
					.await
					.map_err(|reason| Error::Unreachable { url: url.to_string(), reason })?;

				if !(200..=299).contains(&response.status) {
					return Err(Error::NotAnInstance {
						url: url.to_string(),
						reason: format!("status document answered HTTP {}", response.status),
					});
				}

				let status = ServerStatus::from_slice(&response.body)?;

				if !status.installed {
					return Err(Error::NotAnInstance {
						url: url.to_string(),
						reason: "server reports it is not installed".into(),
					});
				}

				Ok(status)
			})
			.await;

		match &result {
			Ok(_) => obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Success),
			Err(_) => obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Failure),
		}

		result
	}
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Flexible {
		Bool(bool),
		Text(String),
	}

	match Flexible::deserialize(deserializer)? {
		Flexible::Bool(value) => Ok(value),
		Flexible::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
			"true" | "1" => Ok(true),
			"false" | "0" | "" => Ok(false),
			other => Err(serde::de::Error::custom(format!("expected a boolean, found `{other}`"))),
		},
	}
}
