// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use dav_setup::{
	_preludet::*,
	auth::{AuthScheme, Credentials},
	policy::ProbePolicy,
	probe::{FolderProvision, ProbeOutcome, Prober, StatusCategory},
	session::{SessionError, SetupEvent, SetupSlot},
};

const STATUS_BODY: &str =
	"{\"installed\":true,\"maintenance\":false,\"version\":\"10.13.0.1\",\"versionstring\":\"10.13.0\",\"edition\":\"\"}";

async fn mock_status(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/status.php");
			then.status(200).body(STATUS_BODY);
		})
		.await;
}

#[tokio::test]
async fn discovery_then_validation_reports_one_event_each() {
	let server = MockServer::start_async().await;

	mock_status(&server).await;

	let challenge = server
		.mock_async(|when, then| {
			when.method(GET).path("/remote.php/webdav/").header_missing("authorization");
			then.status(401);
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/remote.php/webdav/").header("authorization", "Basic dXNlcjpwYXNz");
			then.status(207);
		})
		.await;
	let mut slot = SetupSlot::new();
	let session =
		slot.start(build_reqwest_test_prober()).expect("Empty slot should start a session.");

	assert_eq!(
		session.discover(&server.base_url()).await,
		SetupEvent::AuthType(AuthScheme::HttpCredentials),
	);
	assert_eq!(
		session.server_status().map(|status| status.display_version()),
		Some("10.13.0"),
	);

	let event = session
		.validate(&Credentials::new("user", "pass"))
		.await
		.expect("Validation should run after discovery.");

	assert_eq!(event, SetupEvent::ValidationResult(ProbeOutcome::Success(StatusCategory::Ok(207))));

	challenge.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_status_check_reports_discovery_failure() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/status.php");
			then.status(200).body("{\"installed\":false}");
		})
		.await;

	let capability = server
		.mock_async(|when, then| {
			when.path("/remote.php/webdav/");
			then.status(401);
		})
		.await;
	let mut slot = SetupSlot::new();
	let session =
		slot.start(build_reqwest_test_prober()).expect("Empty slot should start a session.");

	assert!(matches!(
		session.discover(&server.base_url()).await,
		SetupEvent::DiscoveryFailed { .. }
	));
	assert!(matches!(
		session.validate(&Credentials::new("user", "pass")).await,
		Err(SessionError::NotDiscovered)
	));

	capability.assert_calls_async(0).await;
}

#[tokio::test]
async fn federated_servers_refuse_basic_credentials() {
	let client = ScriptedHttpClient::new([ScriptedReply::redirect(
		302,
		"https://idp.example.com/saml/login",
	)]);
	let policy = ProbePolicy { verify_status: false, ..Default::default() };
	let mut slot = SetupSlot::new();
	let session = slot
		.start(Prober::new(client.clone(), policy))
		.expect("Empty slot should start a session.");

	assert_eq!(
		session.discover("cloud.example.com").await,
		SetupEvent::AuthType(AuthScheme::FederatedRedirect),
	);
	assert!(matches!(
		session.validate(&Credentials::new("user", "pass")).await,
		Err(SessionError::FederatedLogin)
	));
	assert!(matches!(
		session.provision(&Credentials::new("user", "pass"), "Photos").await,
		Err(SessionError::FederatedLogin)
	));
	assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn later_steps_follow_the_moved_endpoint() {
	let client = ScriptedHttpClient::new([
		ScriptedReply::redirect(301, "https://cloud.example.com/owncloud/remote.php/webdav/"),
		ScriptedReply::status(401),
		ScriptedReply::status(404),
		ScriptedReply::status(201),
	]);
	let policy = ProbePolicy { verify_status: false, ..Default::default() };
	let mut slot = SetupSlot::new();
	let session = slot
		.start(Prober::new(client.clone(), policy))
		.expect("Empty slot should start a session.");

	assert_eq!(
		session.discover("example.com").await,
		SetupEvent::AuthType(AuthScheme::HttpCredentials),
	);

	let provision = session
		.provision(&Credentials::new("user", "pass"), "Photos")
		.await
		.expect("Provisioning should succeed after discovery.");
	let requests = client.requests();

	assert_eq!(provision, FolderProvision::Created);
	assert_eq!(
		requests[3].url.as_str(),
		"https://cloud.example.com/owncloud/remote.php/webdav/Photos",
	);
}

#[tokio::test]
async fn dropped_discovery_leaves_the_session_usable() {
	let server = MockServer::start_async().await;

	mock_status(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/remote.php/webdav/");
			then.status(401);
		})
		.await;

	let slow = MockServer::start_async().await;

	slow.mock_async(|when, then| {
		when.method(GET).path("/status.php");
		then.status(200).body(STATUS_BODY).delay(Duration::from_secs(5));
	})
	.await;

	let mut slot = SetupSlot::new();
	let session =
		slot.start(build_reqwest_test_prober()).expect("Empty slot should start a session.");

	assert_eq!(
		session.discover(&server.base_url()).await,
		SetupEvent::AuthType(AuthScheme::HttpCredentials),
	);

	let abandoned =
		tokio::time::timeout(Duration::from_millis(200), session.discover(&slow.base_url())).await;

	assert!(abandoned.is_err());
	assert_eq!(
		session.address().map(|address| address.as_str().to_owned()),
		Some(format!("{}/", server.base_url())),
	);
	assert!(session.resolution().is_some());
}

#[test]
fn slot_allows_a_new_session_after_finish() {
	let mut slot = SetupSlot::new();

	slot.start(build_reqwest_test_prober()).expect("Empty slot should start a session.");

	assert!(matches!(
		slot.start(build_reqwest_test_prober()),
		Err(SessionError::AlreadyActive)
	));

	let finished = slot.finish().expect("Active session should be handed back.");

	assert!(finished.resolution().is_none());
	assert!(slot.start(build_reqwest_test_prober()).is_ok());
}
