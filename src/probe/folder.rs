//! Remote folder provisioning beneath the capability endpoint.
//!
//! Creation keeps the long-standing status partitioning of sync clients: `202` means
//! the folder already existed, while any other `2xx` above `202` is an error.

// self
use crate::{
	_prelude::*,
	address::ServerAddress,
	auth::Credentials,
	error::ConfigError,
	http::{ProbeHttpClient, ProbeMethod},
	obs::{self, ProbeKind, ProbeOutcomeLabel, ProbeSpan},
	probe::{self, Prober},
};

/// Status a server uses to report that `MKCOL` found the folder already present.
pub const FOLDER_ALREADY_EXISTS: u16 = 202;

/// Result of [`Prober::check_remote_folder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderPresence {
	/// The folder exists.
	Exists,
	/// The server reported `404`.
	Missing,
}

/// Result of [`Prober::create_remote_folder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderCreation {
	/// The server created the folder.
	Created,
	/// The server answered `202`: the folder was already there.
	AlreadyExisted,
}

/// Result of [`Prober::provision_remote_folder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderProvision {
	/// The existence check found the folder; nothing was created.
	AlreadyPresent,
	/// The folder was missing and has been created.
	Created,
	/// The folder was missing but creation reported it already existed.
	AlreadyExisted,
}

impl<C> Prober<C>
where
	C: ?Sized + ProbeHttpClient,
{
	/// Resolves the WebDAV URL of `folder` beneath `address`.
	///
	/// Surrounding slashes are ignored and each path segment is percent-encoded. An empty
	/// folder resolves to the capability endpoint itself.
	pub fn folder_url(&self, address: &ServerAddress, folder: &str) -> Result<Url> {
		let mut url = self.capability_url(address)?;
		let segments = folder_segments(folder);

		if !segments.is_empty() {
			// http(s) URLs are always a base, so this never skips.
			if let Ok(mut path) = url.path_segments_mut() {
				path.pop_if_empty().extend(segments);
			}
		}

		Ok(url)
	}

	/// Checks whether `folder` exists with a `PROPFIND` of depth zero.
	pub async fn check_remote_folder(
		&self,
		address: &ServerAddress,
		credentials: &Credentials,
		folder: &str,
	) -> Result<FolderPresence> {
		const KIND: ProbeKind = ProbeKind::RemoteFolder;

		let span = ProbeSpan::new(KIND, "check_remote_folder");

		obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Attempt);

		let result = span
			.instrument(async move {
				let url = self.folder_url(address, folder)?;
				let status = self.folder_request(ProbeMethod::Propfind, &url, credentials).await?;

				match status {
					200..=299 => Ok(FolderPresence::Exists),
					404 => Ok(FolderPresence::Missing),
					401 | 403 => Err(Error::InvalidCredentials { status }),
					_ => Err(Error::UnexpectedStatus { url: url.to_string(), status }),
				}
			})
			.await;

		record_result(KIND, &result);

		result
	}

	/// Creates `folder` with `MKCOL`.
	pub async fn create_remote_folder(
		&self,
		address: &ServerAddress,
		credentials: &Credentials,
		folder: &str,
	) -> Result<FolderCreation> {
		const KIND: ProbeKind = ProbeKind::RemoteFolder;

		let span = ProbeSpan::new(KIND, "create_remote_folder");

		obs::record_probe_outcome(KIND, ProbeOutcomeLabel::Attempt);

		let result = span
			.instrument(async move {
				let url = self.folder_url(address, folder)?;
				let status = self.folder_request(ProbeMethod::Mkcol, &url, credentials).await?;

				match status {
					200 | 201 => Ok(FolderCreation::Created),
					FOLDER_ALREADY_EXISTS => Ok(FolderCreation::AlreadyExisted),
					401 | 403 => Err(Error::InvalidCredentials { status }),
					_ => Err(Error::UnexpectedStatus { url: url.to_string(), status }),
				}
			})
			.await;

		record_result(KIND, &result);

		result
	}

	/// Makes sure `folder` exists, creating it when the check reports it missing.
	///
	/// A missing folder with an empty name is a configuration error: there is nothing
	/// to create.
	pub async fn provision_remote_folder(
		&self,
		address: &ServerAddress,
		credentials: &Credentials,
		folder: &str,
	) -> Result<FolderProvision> {
		match self.check_remote_folder(address, credentials, folder).await? {
			FolderPresence::Exists => Ok(FolderProvision::AlreadyPresent),
			FolderPresence::Missing if folder_segments(folder).is_empty() =>
				Err(ConfigError::MissingRemoteFolder.into()),
			FolderPresence::Missing =>
				match self.create_remote_folder(address, credentials, folder).await? {
					FolderCreation::Created => Ok(FolderProvision::Created),
					FolderCreation::AlreadyExisted => Ok(FolderProvision::AlreadyExisted),
				},
		}
	}

	async fn folder_request(
		&self,
		method: ProbeMethod,
		url: &Url,
		credentials: &Credentials,
	) -> Result<u16> {
		self.send(probe::request(method, url, Some(credentials)))
			.await
			.map(|response| response.status)
			.map_err(|reason| Error::Unreachable { url: url.to_string(), reason })
	}
}

fn folder_segments(folder: &str) -> Vec<&str> {
	folder.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn record_result<T>(kind: ProbeKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_probe_outcome(kind, ProbeOutcomeLabel::Success),
		Err(_) => obs::record_probe_outcome(kind, ProbeOutcomeLabel::Failure),
	}
}
