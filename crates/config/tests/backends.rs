//! Integration tests for the bundled backends
//!
//! File-backed loading goes through the direct-decode path, environment and
//! memory backends through raw fetch and conversion.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde::Deserialize;
use stratum_config::prelude::*;
use stratum_config::{FileFormat, Via};

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Retry {
    attempts: u32,
    backoff: String,
}

#[derive(Configurable, Default)]
struct Service {
    #[config("name,required")]
    name: String,
    #[config("port")]
    port: u16,
    #[config("timeout")]
    timeout: Duration,
    #[config("features")]
    features: Vec<String>,
    #[config("retry")]
    retry: Json<Retry>,
    #[config("database.pool")]
    pool: Option<u32>,
}

#[tokio::test]
async fn test_yaml_file_is_decoded_directly() {
    // GIVEN: A YAML document holding every key
    let file = write_file(
        ".yaml",
        "name: billing\n\
         port: 8080\n\
         timeout: 1m30s\n\
         features: [audit, export]\n\
         retry:\n  attempts: 3\n  backoff: exponential\n\
         database:\n  pool: 16\n",
    );
    let mut config = Service::default();

    // WHEN: The configuration is loaded from the file
    let report = Loader::builder()
        .with_backend(FileBackend::new(file.path()))
        .build()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap();

    // THEN: Every field is populated by the decoder
    assert_eq!(config.name, "billing");
    assert_eq!(config.port, 8080);
    assert_eq!(config.timeout, Duration::from_secs(90));
    assert_eq!(config.features, ["audit", "export"]);
    assert_eq!(
        *config.retry,
        Retry {
            attempts: 3,
            backoff: "exponential".into()
        }
    );
    assert_eq!(config.pool, Some(16));
    assert!(report.resolved().iter().all(|field| field.via == Via::Decode));
}

#[tokio::test]
async fn test_memory_overrides_file() {
    // GIVEN: A memory backend ahead of a TOML file
    let file = write_file(".toml", "name = \"from-file\"\nport = 7000\n");
    let overrides = MapBackend::named("overrides").with("port", "7100");
    let mut config = Service::default();

    // WHEN: The configuration is loaded
    let report = Loader::builder()
        .with_backend(overrides)
        .with_backend(FileBackend::new(file.path()).with_name("settings"))
        .build()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap();

    // THEN: The earlier backend wins where both hold a key
    assert_eq!(config.port, 7100);
    assert_eq!(config.name, "from-file");
    assert_eq!(report.source_of("port"), Some("overrides"));
    assert_eq!(report.source_of("name"), Some("settings"));
}

#[tokio::test]
async fn test_file_decode_failure_aborts_the_load() {
    let file = write_file(".json", r#"{"name": "billing", "port": "eighty"}"#);
    let mut config = Service::default();

    let err = Loader::builder()
        .with_backend(FileBackend::new(file.path()))
        .build()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap_err();

    match err {
        LoadError::Backend {
            backend,
            key,
            source: BackendError::Decode { .. },
        } => {
            assert_eq!(backend, "file");
            assert_eq!(key, "port");
        }
        other => panic!("expected decode failure, got {other}"),
    }
    assert_eq!(config.port, 0);
}

#[tokio::test]
async fn test_missing_optional_file_falls_through() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = MapBackend::new().with("name", "fallback");
    let mut config = Service::default();

    Loader::builder()
        .with_backend(FileBackend::new(dir.path().join("absent.yaml")).optional())
        .with_backend(fallback)
        .build()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap();

    assert_eq!(config.name, "fallback");
}

#[tokio::test]
async fn test_missing_required_file_is_a_backend_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Service::default();

    let err = Loader::builder()
        .with_backend(FileBackend::new(dir.path().join("absent.yaml")))
        .build()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Backend {
            source: BackendError::Source { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_explicit_format_overrides_extension() {
    let file = write_file(".conf", r#"{"name": "edge"}"#);
    let mut config = Service::default();

    Loader::builder()
        .with_backend(FileBackend::new(file.path()).with_format(FileFormat::Json))
        .build()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap();

    assert_eq!(config.name, "edge");
}

#[derive(Configurable, Default)]
struct FromEnv {
    #[config("stratum-it-listen-port")]
    port: u16,
    #[config("stratum-it-log-level")]
    level: Option<String>,
}

#[tokio::test]
#[allow(unsafe_code)]
async fn test_default_loader_reads_environment() {
    // GIVEN: An environment variable in conventional form
    // SAFETY: the variable names are unique to this test.
    unsafe { std::env::set_var("STRATUM_IT_LISTEN_PORT", "4040") };

    let mut config = FromEnv::default();

    // WHEN: The default loader runs
    let report = Loader::default()
        .load(&LoadContext::new(), &mut config)
        .await
        .unwrap();

    // THEN: The variable is found, the unset one leaves the field empty
    assert_eq!(config.port, 4040);
    assert_eq!(config.level, None);
    assert_eq!(report.source_of("stratum-it-listen-port"), Some("env"));
    assert_eq!(report.unresolved(), ["stratum-it-log-level"]);
}

#[tokio::test]
async fn test_custom_backend_shared_between_loaders() {
    let shared: Arc<dyn Backend> = Arc::new(MapBackend::named("shared").with("name", "one"));
    let first = Loader::builder().with_shared_backend(Arc::clone(&shared)).build();
    let second = Loader::new(vec![shared]);

    let mut a = Service::default();
    let mut b = Service::default();
    first.load(&LoadContext::new(), &mut a).await.unwrap();
    second.load(&LoadContext::new(), &mut b).await.unwrap();

    assert_eq!(a.name, b.name);
}
