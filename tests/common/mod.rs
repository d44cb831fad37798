//! Shared fixtures for the integration tests: a manager/client pair wired
//! to a mock server, with session storage in a temp directory.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use petrack_core::{ApiClient, Config, Notifier, SessionData, SessionManager, SessionStore};
use tempfile::TempDir;

pub struct TestContext {
    pub notifier: Notifier,
    pub auth: Arc<SessionManager>,
    pub api: ApiClient,
    pub store: SessionStore,
    // Keeps the cache directory alive for the duration of the test
    _cache_dir: TempDir,
}

pub fn setup(base_url: &str) -> TestContext {
    build(base_url, tempfile::tempdir().unwrap())
}

/// Like `setup`, but with a session already persisted before the manager
/// starts, as if the app had been restarted.
pub fn setup_with_session(base_url: &str, session: &SessionData) -> TestContext {
    let cache_dir = tempfile::tempdir().unwrap();
    SessionStore::new(cache_dir.path().to_path_buf())
        .save(session)
        .unwrap();
    build(base_url, cache_dir)
}

/// Route library tracing through the test harness; `RUST_LOG` filters as
/// usual. Later calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build(base_url: &str, cache_dir: TempDir) -> TestContext {
    init_tracing();
    let config = Config {
        api_base_url: Some(base_url.to_string()),
        last_username: None,
        cache_dir: Some(cache_dir.path().to_path_buf()),
    };
    let notifier = Notifier::new();
    let auth = SessionManager::init(&config, notifier.clone()).unwrap();
    let api = ApiClient::new(&config, auth.clone()).unwrap();
    let store = SessionStore::new(cache_dir.path().to_path_buf());
    TestContext {
        notifier,
        auth,
        api,
        store,
        _cache_dir: cache_dir,
    }
}

/// A healthy session: valid for an hour, refresh token present.
pub fn valid_session(access: &str, refresh: Option<&str>) -> SessionData {
    SessionData {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at: Utc::now() + Duration::hours(1),
        user_photo_url: None,
    }
}
