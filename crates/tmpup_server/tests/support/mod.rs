//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use std::path::Path;
use tempfile::TempDir;
use tmpup_server::{create_app, AppState, Config, Connection};

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_upload_size: 1024 * 1024,
        prune_interval_secs: 3_600,
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    Connection::initialize(&config.db_path).expect("initialize db");
    let state = AppState::new(config).expect("routes");
    TestServer::new(create_app(state)).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");
    let server = test_server_for_config(test_config_for_db_path(&db_path));
    (server, temp_dir)
}
