#![cfg(feature = "template")]

use firestore_emulator::{Error, FirestoreEmulatorConfig, configure};
use gcp_credentials::{Credentials, CredentialsInterceptor};
use tonic::service::Interceptor;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn test_configure_from_json() {
    init_tracing();

    let config = FirestoreEmulatorConfig::from_json_str(
        r#"{"enabled": true, "hostPort": "localhost:9000", "projectId": "proj1"}"#,
    )
    .expect("valid config");

    let components = configure(&config)
        .expect("should build emulator components")
        .expect("emulator is enabled");

    let options = &components.options;
    assert_eq!(options.project_id(), "proj1");
    assert_eq!(options.resource_prefix(), "projects/proj1/databases/(default)");
    assert_eq!(options.channel_options().endpoint(), "localhost:9000");
    assert!(options.channel_options().is_plaintext());

    let creds = options.credentials();
    assert_eq!(creds.authentication_type(), None);
    assert!(creds.has_request_metadata());
    assert!(creds.has_request_metadata_only());

    let uri = http::Uri::from_static("http://localhost:9000/google.firestore.v1.Firestore/Listen");
    let with_uri = creds.request_metadata(Some(&uri)).unwrap();
    let without_uri = creds.request_metadata(None).unwrap();
    assert_eq!(with_uri, without_uri);

    assert_eq!(with_uri.len(), 2);
    assert_eq!(with_uri["Authorization"], ["Bearer owner"]);
    assert_eq!(
        with_uri["google-cloud-resource-prefix"],
        ["projects/proj1/databases/(default)"]
    );

    creds.refresh().unwrap();
    assert_eq!(creds.request_metadata(None).unwrap(), without_uri);

    assert_eq!(
        components.template.parent(),
        "projects/proj1/databases/(default)/documents"
    );
    assert!(!components.template.is_using_stream_tokens());
    assert_eq!(
        components.template.document_name("users", "alice"),
        "projects/proj1/databases/(default)/documents/users/alice"
    );
}

#[tokio::test]
async fn test_options_feed_generated_clients() {
    init_tracing();

    let config = FirestoreEmulatorConfig::enabled("localhost:9000", "proj1");
    let components = configure(&config).unwrap().unwrap();

    // generated clients take an interceptor, built from the same credentials.
    let mut interceptor =
        CredentialsInterceptor::new(components.options.credentials().clone()).unwrap();
    let req = interceptor.call(tonic::Request::new(())).unwrap();

    let prefix = req.metadata().get("google-cloud-resource-prefix").unwrap();
    assert_eq!(prefix.to_str().unwrap(), "projects/proj1/databases/(default)");

    // and options can produce their own stub
    let stub = components.options.connect_lazy().unwrap();
    assert_eq!(
        stub.credentials().request_metadata(None).unwrap(),
        components.stub.credentials().request_metadata(None).unwrap()
    );
}

#[test]
fn test_disabled_ignores_everything_else() {
    init_tracing();

    let config = FirestoreEmulatorConfig::from_json_str(
        r#"{"enabled": false, "hostPort": "::::", "projectId": null}"#,
    )
    .unwrap();

    assert!(configure(&config).unwrap().is_none());
}

#[test]
fn test_missing_project_id_is_fatal() {
    init_tracing();

    let config = FirestoreEmulatorConfig::from_json_str(r#"{"enabled": true}"#).unwrap();

    match configure(&config) {
        Err(Error::MissingProjectId) => (),
        other => panic!("expected a missing project id error, got {other:?}"),
    }
}
