//! Test helpers: build the router around a scripted remote.
//!
//! Run from workspace root: `cargo test -p roost-api`.

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::TestServer;
use roost_api::setup::routes;
use roost_api::state::AppState;
use roost_core::Config;
use roost_services::testing::MockRemote;
use roost_services::{build_cache, TwitterProxy};

pub const SCREEN_NAME: &str = "rtainjapan";

/// API path prefix for tests (e.g. `/api/twitter/statuses/hash`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", roost_api::constants::API_PREFIX, path)
}

/// Test application: server plus the remote double it talks to.
pub struct TestApp {
    pub server: TestServer,
    pub remote: Arc<MockRemote>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("CONSUMER_KEY", "ck"),
        ("CONSUMER_SECRET", "cs"),
        ("ACCESS_TOKEN", "at"),
        ("ACCESS_TOKEN_SECRET", "ats"),
        ("SCREEN_NAME", SCREEN_NAME),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(move |key| vars.get(key).cloned()).expect("test config")
}

pub fn setup_test_app(remote: MockRemote) -> TestApp {
    setup_test_app_with(remote, &[])
}

pub fn setup_test_app_with(remote: MockRemote, overrides: &[(&str, &str)]) -> TestApp {
    let config = test_config(overrides);
    let remote = Arc::new(remote);
    let proxy = TwitterProxy::new(remote.clone(), build_cache(&config.cache), config.proxy.clone());
    let state = Arc::new(AppState::new(proxy, config.clone()));

    let router = routes::setup_routes(&config, state).expect("routes");
    let server = TestServer::new(router).expect("test server");

    TestApp { server, remote }
}
