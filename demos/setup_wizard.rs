//! Walks a setup session through discovery, credential validation, and folder provisioning
//! against a mock server whose WebDAV endpoint moved behind a redirect.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use dav_setup::{
	auth::Credentials,
	probe::{Prober, ValidationVerdict},
	session::{SetupEvent, SetupSlot},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/status.php");
			then.status(200).header("content-type", "application/json").body(
				"{\"installed\":true,\"maintenance\":false,\"version\":\"10.13.0.1\",\"versionstring\":\"10.13.0\",\"edition\":\"Community\"}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/remote.php/webdav/");
			then.status(301).header("location", server.url("/cloud/remote.php/webdav/"));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/cloud/remote.php/webdav/").header_missing("authorization");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/cloud/remote.php/webdav/").header_exists("authorization");
			then.status(207);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.path("/cloud/remote.php/webdav/Documents");
			then.status(207);
		})
		.await;

	let mut slot = SetupSlot::new();
	let session = slot.start(Prober::reqwest()?)?;

	match session.discover(&server.base_url()).await {
		SetupEvent::AuthType(scheme) => println!("Server expects {scheme}."),
		other => {
			println!("Discovery did not settle: {other:?}.");

			return Ok(());
		},
	}

	if let Some(status) = session.server_status() {
		println!("Server version: {}.", status.display_version());
	}
	if let Some(address) = session.effective_address() {
		println!("WebDAV endpoint lives under {address}.");
	}

	let credentials = Credentials::new("demo", "demo-password");

	if let SetupEvent::ValidationResult(outcome) = session.validate(&credentials).await? {
		println!("Credentials verdict: {:?}.", ValidationVerdict::classify(&outcome));
	}

	let provision = session.provision(&credentials, "Documents").await?;

	println!("Remote folder: {provision:?}.");

	slot.finish();

	Ok(())
}
