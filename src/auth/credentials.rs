//! User credentials with redacted password handling.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping passwords out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// User name and password entered during setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Account user name.
	pub user: String,
	/// Account password.
	pub password: Secret,
}
impl Credentials {
	/// Creates credentials from a user name and password.
	pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
		Self { user: user.into(), password: Secret::new(password) }
	}

	/// Renders the HTTP Basic `Authorization` header value.
	pub fn basic_authorization(&self) -> Secret {
		let raw = format!("{}:{}", self.user, self.password.expose());

		Secret::new(format!("Basic {}", STANDARD.encode(raw)))
	}
}
