// crates.io
use httpmock::prelude::*;
// self
use dav_setup::{
	_preludet::*,
	address::ServerAddress,
	auth::Credentials,
	error::ConfigError,
	http::ProbeMethod,
	policy::ProbePolicy,
	probe::{FolderCreation, FolderPresence, FolderProvision, Prober},
};

fn address(server: &MockServer) -> ServerAddress {
	ServerAddress::new(server.base_url()).expect("Mock server address should parse.")
}

fn credentials() -> Credentials {
	Credentials::new("user", "pass")
}

fn scripted(
	replies: impl IntoIterator<Item = ScriptedReply>,
) -> (Prober<ScriptedHttpClient>, ScriptedHttpClient) {
	let client = ScriptedHttpClient::new(replies);

	(Prober::new(client.clone(), ProbePolicy::default()), client)
}

#[test]
fn folder_urls_encode_each_segment() {
	let prober = build_reqwest_test_prober();
	let address = ServerAddress::new("cloud.example.com").expect("Bare host should parse.");
	let url = prober
		.folder_url(&address, "/Shared Photos/2024/")
		.expect("Folder URL should resolve.");

	assert_eq!(url.as_str(), "https://cloud.example.com/remote.php/webdav/Shared%20Photos/2024");
}

#[tokio::test]
async fn multistatus_answer_means_the_folder_exists() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.path("/remote.php/webdav/Photos").header("depth", "0");
			then.status(207).body("<d:multistatus xmlns:d=\"DAV:\"/>");
		})
		.await;
	let prober = build_reqwest_test_prober();
	let presence = prober
		.check_remote_folder(&address(&server), &credentials(), "Photos")
		.await
		.expect("Folder check should succeed.");

	assert_eq!(presence, FolderPresence::Exists);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn mkcol_accepted_means_the_folder_already_existed() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.path("/remote.php/webdav/Photos");
			then.status(202);
		})
		.await;

	let prober = build_reqwest_test_prober();
	let creation = prober
		.create_remote_folder(&address(&server), &credentials(), "Photos")
		.await
		.expect("Accepted MKCOL should succeed.");

	assert_eq!(creation, FolderCreation::AlreadyExisted);
}

#[tokio::test]
async fn mkcol_multistatus_is_unexpected() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.path("/remote.php/webdav/Photos");
			then.status(207);
		})
		.await;

	let prober = build_reqwest_test_prober();
	let err = prober
		.create_remote_folder(&address(&server), &credentials(), "Photos")
		.await
		.expect_err("207 on MKCOL should be rejected.");

	assert!(matches!(err, Error::UnexpectedStatus { status: 207, .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn provisioning_creates_missing_folders() {
	let (prober, client) = scripted([ScriptedReply::status(404), ScriptedReply::status(201)]);
	let address = ServerAddress::new("cloud.example.com").expect("Bare host should parse.");
	let provision = prober
		.provision_remote_folder(&address, &credentials(), "Photos")
		.await
		.expect("Provisioning should succeed.");
	let requests = client.requests();

	assert_eq!(provision, FolderProvision::Created);
	assert_eq!(requests.len(), 2);
	assert_eq!(requests[0].method, ProbeMethod::Propfind);
	assert_eq!(requests[1].method, ProbeMethod::Mkcol);
	assert!(requests.iter().all(|request| request.authorization.is_some()));
}

#[tokio::test]
async fn provisioning_skips_creation_for_present_folders() {
	let (prober, client) = scripted([ScriptedReply::status(207)]);
	let address = ServerAddress::new("cloud.example.com").expect("Bare host should parse.");
	let provision = prober
		.provision_remote_folder(&address, &credentials(), "Photos")
		.await
		.expect("Provisioning should succeed.");

	assert_eq!(provision, FolderProvision::AlreadyPresent);
	assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn provisioning_rejects_bad_credentials_and_empty_names() {
	let (prober, _) = scripted([ScriptedReply::status(401)]);
	let address = ServerAddress::new("cloud.example.com").expect("Bare host should parse.");
	let err = prober
		.provision_remote_folder(&address, &credentials(), "Photos")
		.await
		.expect_err("Rejected credentials should fail provisioning.");

	assert!(matches!(err, Error::InvalidCredentials { status: 401 }), "unexpected error: {err:?}");

	let (prober, _) = scripted([ScriptedReply::status(404)]);
	let err = prober
		.provision_remote_folder(&address, &credentials(), "/")
		.await
		.expect_err("A missing root folder cannot be created.");

	assert!(
		matches!(err, Error::Config(ConfigError::MissingRemoteFolder)),
		"unexpected error: {err:?}"
	);
}
