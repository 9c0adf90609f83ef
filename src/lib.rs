//! WebDAV server discovery for sync-client setup: probe authentication schemes across
//! redirect chains, validate credentials, and provision remote folders behind one
//! transport-agnostic prober.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod address;
pub mod auth;
pub mod error;
pub mod http;
pub mod obs;
pub mod policy;
pub mod probe;
pub mod session;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		http::{ProbeFuture, ProbeHttpClient, ProbeRequest, ProbeResponse, ReqwestProbeClient},
		policy::ProbePolicy,
		probe::Prober,
	};

	/// Prober type alias used by reqwest-backed integration tests.
	pub type ReqwestTestProber = Prober<ReqwestProbeClient>;

	/// Builds a reqwest probe client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_probe_client() -> ReqwestProbeClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestProbeClient::with_client(client)
			.expect("Failed to wrap insecure Reqwest client for tests.")
	}

	/// Constructs a [`Prober`] with the default policy and the reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_prober() -> ReqwestTestProber {
		Prober::new(test_reqwest_probe_client(), ProbePolicy::default())
	}

	/// Error emitted by [`ScriptedHttpClient`] when a scripted step simulates a dead link.
	#[derive(Debug, ThisError)]
	#[error("Scripted transport failure: {0}.")]
	pub struct ScriptedTransportError(pub String);

	/// Canned reply consumed by [`ScriptedHttpClient`].
	#[derive(Clone, Debug)]
	pub enum ScriptedReply {
		/// Answer with the given response.
		Respond(ProbeResponse),
		/// Fail at the transport layer.
		Fail(String),
	}
	impl ScriptedReply {
		/// Response carrying only a status code.
		pub fn status(status: u16) -> Self {
			Self::Respond(ProbeResponse::new(status))
		}

		/// Redirect response pointing at `location`.
		pub fn redirect(status: u16, location: &str) -> Self {
			Self::Respond(ProbeResponse::new(status).with_location(location))
		}

		/// Response carrying a body.
		pub fn body(status: u16, body: &str) -> Self {
			Self::Respond(ProbeResponse::new(status).with_body(body.as_bytes().to_vec()))
		}
	}

	/// In-memory [`ProbeHttpClient`] that replays scripted replies in order and records every
	/// request it receives.
	///
	/// Once the script runs dry the last reply repeats, which makes redirect loops easy to
	/// express.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedHttpClient {
		replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
		last: Arc<Mutex<Option<ScriptedReply>>>,
		requests: Arc<Mutex<Vec<ProbeRequest>>>,
	}
	impl ScriptedHttpClient {
		/// Creates a client that replays `replies`.
		pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			Self {
				replies: Arc::new(Mutex::new(replies.into_iter().collect())),
				..Default::default()
			}
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<ProbeRequest> {
			self.requests.lock().clone()
		}
	}
	impl ProbeHttpClient for ScriptedHttpClient {
		type TransportError = ScriptedTransportError;

		fn execute(&self, request: ProbeRequest) -> ProbeFuture<'_, Self::TransportError> {
			self.requests.lock().push(request);

			let reply = match self.replies.lock().pop_front() {
				Some(reply) => {
					*self.last.lock() = Some(reply.clone());

					Some(reply)
				},
				None => self.last.lock().clone(),
			};

			Box::pin(async move {
				match reply {
					Some(ScriptedReply::Respond(response)) => Ok(response),
					Some(ScriptedReply::Fail(reason)) => Err(ScriptedTransportError(reason)),
					None => Err(ScriptedTransportError("script exhausted".into())),
				}
			})
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
