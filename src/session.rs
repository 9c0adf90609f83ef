//! Setup-wizard session: one discovery, validation, and provisioning run at a time.
//!
//! A [`SetupSlot`] owns at most one [`SetupSession`]. Each session step takes
//! `&mut self`, so a session never runs two steps concurrently, and each step reports
//! exactly one [`SetupEvent`]. Dropping a step's future cancels it without touching the
//! state committed by earlier steps.

// self
use crate::{
	_prelude::*,
	address::ServerAddress,
	auth::{AuthScheme, Credentials},
	error::ConfigError,
	http::ProbeHttpClient,
	probe::{FolderProvision, ProbeOutcome, Prober, Resolution, ServerStatus},
};

/// Errors raised by session bookkeeping rather than by the server.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// A session is already running in this slot.
	#[error("A setup session is already active.")]
	AlreadyActive,
	/// The step needs a resolved discovery first.
	#[error("Server discovery has not resolved an authentication scheme yet.")]
	NotDiscovered,
	/// The server expects a federated login, so basic credentials do not apply.
	#[error("Server requires a federated login; basic credentials cannot be used.")]
	FederatedLogin,
	/// The underlying operation failed.
	#[error(transparent)]
	Probe(#[from] Error),
}

/// Single report produced by a session step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupEvent {
	/// Discovery settled on a scheme.
	AuthType(AuthScheme),
	/// Discovery could not settle on a scheme.
	DiscoveryFailed {
		/// Human-readable cause.
		reason: String,
	},
	/// Raw outcome of the credential probe.
	ValidationResult(ProbeOutcome),
}

/// Owned slot holding at most one active [`SetupSession`].
pub struct SetupSlot<C>
where
	C: ?Sized + ProbeHttpClient,
{
	active: Option<SetupSession<C>>,
}
impl<C> SetupSlot<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// Creates an empty slot.
	pub fn new() -> Self {
		Self { active: None }
	}

	/// Starts a session driven by `prober`.
	pub fn start(&mut self, prober: Prober<C>) -> Result<&mut SetupSession<C>, SessionError> {
		if self.active.is_some() {
			return Err(SessionError::AlreadyActive);
		}

		Ok(self.active.insert(SetupSession::new(prober)))
	}

	/// Ends the active session, handing it back to the caller.
	pub fn finish(&mut self) -> Option<SetupSession<C>> {
		self.active.take()
	}

	/// Returns the active session, if any.
	pub fn session(&mut self) -> Option<&mut SetupSession<C>> {
		self.active.as_mut()
	}

	/// Returns `true` while a session is active.
	pub fn is_active(&self) -> bool {
		self.active.is_some()
	}
}
impl<C> Default for SetupSlot<C>
where
	C: ?Sized + ProbeHttpClient,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<C> Debug for SetupSlot<C>
where
	C: ?Sized + ProbeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SetupSlot").field("active", &self.active).finish()
	}
}

/// State of one setup run.
pub struct SetupSession<C>
where
	C: ?Sized + ProbeHttpClient,
{
	prober: Prober<C>,
	address: Option<ServerAddress>,
	status: Option<ServerStatus>,
	resolution: Option<Resolution>,
}
impl<C> SetupSession<C>
where
	C: ?Sized + ProbeHttpClient,
{
	fn new(prober: Prober<C>) -> Self {
		Self { prober, address: None, status: None, resolution: None }
	}

	/// Returns the prober driving this session.
	pub fn prober(&self) -> &Prober<C> {
		&self.prober
	}

	/// Address parsed by the last successful discovery.
	pub fn address(&self) -> Option<&ServerAddress> {
		self.address.as_ref()
	}

	/// Status document read by the last successful discovery, when checking is enabled.
	pub fn server_status(&self) -> Option<&ServerStatus> {
		self.status.as_ref()
	}

	/// Resolution of the last successful discovery.
	pub fn resolution(&self) -> Option<&Resolution> {
		self.resolution.as_ref()
	}

	/// Address later steps talk to: the endpoint's new home after same-path redirects,
	/// else the parsed address.
	pub fn effective_address(&self) -> Option<ServerAddress> {
		let address = self.address.as_ref()?;
		let moved = self
			.resolution
			.as_ref()
			.and_then(|resolution| resolution.effective_address(&self.prober.policy().capability_path));

		Some(moved.unwrap_or_else(|| address.clone()))
	}

	/// Parses `input`, optionally checks the status document, and discovers the scheme.
	///
	/// State is replaced only once the run completes. A failed run clears it.
	pub async fn discover(&mut self, input: &str) -> SetupEvent {
		match self.run_discovery(input).await {
			Ok((address, status, resolution)) => {
				let scheme = resolution.scheme;

				self.address = Some(address);
				self.status = status;
				self.resolution = Some(resolution);

				SetupEvent::AuthType(scheme)
			},
			Err(err) => {
				self.address = None;
				self.status = None;
				self.resolution = None;

				SetupEvent::DiscoveryFailed { reason: err.to_string() }
			},
		}
	}

	/// Probes the discovered server once with `credentials`.
	pub async fn validate(&mut self, credentials: &Credentials) -> Result<SetupEvent, SessionError> {
		let address = self.basic_auth_address()?;
		let outcome = self.prober.validate(&address, credentials).await?;

		Ok(SetupEvent::ValidationResult(outcome))
	}

	/// Makes sure `folder` exists on the discovered server.
	pub async fn provision(
		&mut self,
		credentials: &Credentials,
		folder: &str,
	) -> Result<FolderProvision, SessionError> {
		let address = self.basic_auth_address()?;

		Ok(self.prober.provision_remote_folder(&address, credentials, folder).await?)
	}

	async fn run_discovery(
		&self,
		input: &str,
	) -> Result<(ServerAddress, Option<ServerStatus>, Resolution)> {
		let address = ServerAddress::new(input).map_err(ConfigError::from)?;
		let status = if self.prober.policy().verify_status {
			Some(self.prober.check_server(&address).await?)
		} else {
			None
		};
		let resolution = self.prober.discover(&address).await?;

		Ok((address, status, resolution))
	}

	fn basic_auth_address(&self) -> Result<ServerAddress, SessionError> {
		match (&self.resolution, self.effective_address()) {
			(Some(resolution), _) if resolution.scheme == AuthScheme::FederatedRedirect =>
				Err(SessionError::FederatedLogin),
			(Some(_), Some(address)) => Ok(address),
			_ => Err(SessionError::NotDiscovered),
		}
	}
}
impl<C> Debug for SetupSession<C>
where
	C: ?Sized + ProbeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SetupSession")
			.field("address", &self.address)
			.field("status", &self.status)
			.field("resolution", &self.resolution)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		http::{ProbeFuture, ProbeRequest},
		policy::ProbePolicy,
	};

	struct Offline;
	impl ProbeHttpClient for Offline {
		type TransportError = std::io::Error;

		fn execute(&self, _: ProbeRequest) -> ProbeFuture<'_, Self::TransportError> {
			Box::pin(async { Err(std::io::Error::other("network is unreachable")) })
		}
	}

	fn offline_prober() -> Prober<Offline> {
		Prober::new(Offline, ProbePolicy::default())
	}

	#[test]
	fn slot_holds_one_session_at_a_time() {
		let mut slot = SetupSlot::new();

		slot.start(offline_prober()).expect("Empty slot should start a session.");

		assert!(matches!(slot.start(offline_prober()), Err(SessionError::AlreadyActive)));
		assert!(slot.finish().is_some());
		assert!(!slot.is_active());

		slot.start(offline_prober()).expect("Finished slot should start a new session.");
	}

	#[test]
	fn steps_before_discovery_are_rejected() {
		let mut slot = SetupSlot::new();
		let session = slot.start(offline_prober()).expect("Empty slot should start a session.");

		assert!(matches!(session.basic_auth_address(), Err(SessionError::NotDiscovered)));
		assert!(session.effective_address().is_none());
	}

	#[tokio::test]
	async fn unreachable_servers_report_discovery_failure() {
		let mut slot = SetupSlot::new();
		let session = slot.start(offline_prober()).expect("Empty slot should start a session.");

		match session.discover("cloud.example.com").await {
			SetupEvent::DiscoveryFailed { reason } =>
				assert!(reason.contains("network is unreachable"), "unexpected reason: {reason}"),
			other => panic!("Unexpected event: {other:?}."),
		}

		assert!(session.resolution().is_none());
	}

	#[tokio::test]
	async fn unparsable_input_reports_discovery_failure() {
		let mut slot = SetupSlot::new();
		let session = slot.start(offline_prober()).expect("Empty slot should start a session.");

		assert!(matches!(
			session.discover("ftp://cloud.example.com").await,
			SetupEvent::DiscoveryFailed { .. }
		));
	}
}
