use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use equipviz::config::ApiConfig;
use equipviz::session::{Credential, MemoryCredentialStore, SessionHandle};
use equipviz::ApiClient;

/// `Authorization` value for admin:secret.
#[allow(dead_code)]
pub const ADMIN_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

#[allow(dead_code)]
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api", server.uri()),
        timeout_seconds: 5,
    }
}

/// Session backed by memory, logged in as admin:secret when `logged_in`.
#[allow(dead_code)]
pub fn memory_session(logged_in: bool) -> (SessionHandle, Arc<MemoryCredentialStore>) {
    let store = if logged_in {
        Arc::new(MemoryCredentialStore::with_credential(
            Credential::from_parts("admin", "secret").as_str(),
        ))
    } else {
        Arc::new(MemoryCredentialStore::default())
    };
    let session = SessionHandle::new(store.clone());
    session.restore().expect("memory store never fails");
    (session, store)
}

#[allow(dead_code)]
pub fn client_for(server: &MockServer, session: SessionHandle) -> ApiClient {
    ApiClient::new(&api_config(server), session).expect("valid client config")
}

#[allow(dead_code)]
pub fn datasets_body(ids: &[i64]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "file": format!("datasets/plant_{}.csv", id),
                    "uploaded_at": format!("2024-03-01T12:{:02}:00Z", id % 60),
                })
            })
            .collect(),
    )
}

#[allow(dead_code)]
pub fn stats_body(total: u64) -> Value {
    json!({
        "total_count": total,
        "average_temperature": 81.5,
        "average_flowrate": 120.25,
        "average_pressure": 6.1,
        "type_distribution": {"Pump": 2, "Valve": 1},
        "data": [
            {"Equipment Name": "Pump-1", "Type": "Pump", "Flowrate": 120.5, "Pressure": 6.2, "Temperature": 80.1},
            {"Equipment Name": "Pump-2", "Type": "Pump", "Flowrate": "118.0", "Pressure": 5.9, "Temperature": 82.0},
            {"Equipment Name": "Valve-1", "Type": "Valve", "Pressure": null, "Temperature": 82.4}
        ]
    })
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
