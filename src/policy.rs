//! Probe policy: endpoint paths, the redirect bound, and federation markers.
//!
//! [`ProbePolicy`] deserializes with `#[serde(default)]`, so a partial document
//! (for example `{"max_redirects": 5}`) keeps the remaining defaults. Call
//! [`ProbePolicy::validate`] before handing a deserialized policy to a prober;
//! [`Prober::with_policy`](crate::probe::Prober::with_policy) does this for you.

// self
use crate::_prelude::*;

/// WebDAV endpoint probed for capability and authentication discovery.
pub const CAPABILITY_PATH: &str = "remote.php/webdav/";
/// Public server status document.
pub const STATUS_PATH: &str = "status.php";
/// Maximum number of same-path redirect hops followed during discovery.
pub const MAX_REDIRECTS: u32 = 10;
/// Redirect-target substrings that identify a federated (SSO) login.
pub const FEDERATION_MARKERS: [&str; 2] = ["SAML", "wayf"];

/// Errors raised while validating a [`ProbePolicy`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PolicyError {
	/// Endpoint paths must not be empty.
	#[error("The {endpoint} path cannot be empty.")]
	EmptyPath {
		/// Which path failed validation.
		endpoint: &'static str,
	},
	/// Endpoint paths must be relative so they join beneath the server base.
	#[error("The {endpoint} path must be relative: {path}.")]
	AbsolutePath {
		/// Which path failed validation.
		endpoint: &'static str,
		/// Offending path.
		path: String,
	},
	/// The capability path must name a collection.
	#[error("The capability path must end with `/`: {path}.")]
	CapabilityPathNotCollection {
		/// Offending path.
		path: String,
	},
	/// Federation markers must contain visible text.
	#[error("Federation markers cannot be blank.")]
	BlankMarker,
}

/// Tunables shared by every probe a [`Prober`](crate::probe::Prober) issues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbePolicy {
	/// Path, relative to the server base, probed for auth discovery and validation.
	pub capability_path: String,
	/// Path, relative to the server base, of the public status document.
	pub status_path: String,
	/// Same-path redirect hops followed before discovery gives up.
	pub max_redirects: u32,
	/// Case-insensitive substrings marking a redirect target as federated login.
	pub federation_markers: Vec<String>,
	/// Whether setup sessions read the status document before discovery.
	pub verify_status: bool,
}
impl ProbePolicy {
	/// Validates invariants for the policy.
	pub fn validate(&self) -> Result<(), PolicyError> {
		validate_path("capability", &self.capability_path)?;
		validate_path("status", &self.status_path)?;

		if !self.capability_path.ends_with('/') {
			return Err(PolicyError::CapabilityPathNotCollection {
				path: self.capability_path.clone(),
			});
		}
		if self.federation_markers.iter().any(|marker| marker.trim().is_empty()) {
			return Err(PolicyError::BlankMarker);
		}

		Ok(())
	}

	/// Returns the first federation marker contained in `target`, ignoring case.
	pub fn federation_marker(&self, target: &str) -> Option<&str> {
		let haystack = target.to_lowercase();

		self.federation_markers
			.iter()
			.find(|marker| haystack.contains(&marker.to_lowercase()))
			.map(String::as_str)
	}
}
impl Default for ProbePolicy {
	fn default() -> Self {
		Self {
			capability_path: CAPABILITY_PATH.into(),
			status_path: STATUS_PATH.into(),
			max_redirects: MAX_REDIRECTS,
			federation_markers: FEDERATION_MARKERS.iter().map(|marker| (*marker).into()).collect(),
			verify_status: true,
		}
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), PolicyError> {
	if path.trim().is_empty() {
		return Err(PolicyError::EmptyPath { endpoint });
	}
	if path.starts_with('/') || path.contains("://") {
		return Err(PolicyError::AbsolutePath { endpoint, path: path.to_owned() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let policy = ProbePolicy::default();

		assert_eq!(policy.capability_path, "remote.php/webdav/");
		assert_eq!(policy.max_redirects, 10);
		assert_eq!(policy.validate(), Ok(()));
	}

	#[test]
	fn partial_documents_keep_defaults() {
		let policy: ProbePolicy = serde_json::from_str("{\"max_redirects\":3}")
			.expect("Partial policy should deserialize.");

		assert_eq!(policy.max_redirects, 3);
		assert_eq!(policy.status_path, STATUS_PATH);
		assert_eq!(policy.federation_markers, ["SAML", "wayf"]);
	}

	#[test]
	fn rejects_absolute_and_blank_settings() {
		let policy =
			ProbePolicy { capability_path: "/remote.php/webdav/".into(), ..Default::default() };

		assert!(matches!(
			policy.validate(),
			Err(PolicyError::AbsolutePath { endpoint: "capability", .. })
		));

		let policy = ProbePolicy { capability_path: "remote.php/webdav".into(), ..Default::default() };

		assert!(matches!(policy.validate(), Err(PolicyError::CapabilityPathNotCollection { .. })));

		let policy = ProbePolicy { status_path: " ".into(), ..Default::default() };

		assert_eq!(policy.validate(), Err(PolicyError::EmptyPath { endpoint: "status" }));

		let policy = ProbePolicy { federation_markers: vec![" ".into()], ..Default::default() };

		assert_eq!(policy.validate(), Err(PolicyError::BlankMarker));
	}

	#[test]
	fn federation_markers_match_case_insensitively() {
		let policy = ProbePolicy::default();

		assert_eq!(policy.federation_marker("https://idp.example.com/saml2/sso"), Some("SAML"));
		assert_eq!(policy.federation_marker("https://example.com/WAYF?entity=x"), Some("wayf"));
		assert_eq!(policy.federation_marker("https://example.com/login"), None);
	}
}
