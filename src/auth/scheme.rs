//! Authentication schemes a server can ask for.

// self
use crate::_prelude::*;

/// Authentication scheme selected by discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
	/// User name and password sent as HTTP credentials.
	HttpCredentials,
	/// Login delegated to a separate identity provider (SAML/Shibboleth style).
	FederatedRedirect,
}
impl AuthScheme {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthScheme::HttpCredentials => "http_credentials",
			AuthScheme::FederatedRedirect => "federated_redirect",
		}
	}
}
impl Display for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_match_serde_names() {
		for scheme in [AuthScheme::HttpCredentials, AuthScheme::FederatedRedirect] {
			let payload = serde_json::to_string(&scheme).expect("Scheme should serialize.");

			assert_eq!(payload, format!("\"{scheme}\""));
		}
	}
}
