#![allow(dead_code)]

use std::path::Path;

use dagma::{DagmaConfig, Definitions};
use mockito::ServerGuard;

/// Port 9 (discard) refuses connections, so any request made against this
/// config fails fast with a connection error.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Default settings with every backend pointed at an unreachable address and
/// local output under `base`.
pub fn offline_config(base: &Path) -> DagmaConfig {
    let mut config = DagmaConfig::default();
    config.qdrant.host = "127.0.0.1".into();
    config.qdrant.port = 9;
    config.qdrant.timeout = 2.0;
    config.langflow.base_url = UNREACHABLE.into();
    config.langflow.timeout = 2.0;
    config.runtime.base_path = base.to_path_buf();
    config.runtime.dashboard_dir = base.join("dash");
    config
}

/// Point the Qdrant section at a mock server.
pub fn with_qdrant(mut config: DagmaConfig, server: &ServerGuard) -> DagmaConfig {
    let host_port = server.host_with_port();
    let (host, port) = host_port.rsplit_once(':').unwrap();
    config.qdrant.host = host.to_string();
    config.qdrant.port = port.parse().unwrap();
    config
}

pub fn definitions(config: &DagmaConfig) -> Definitions {
    Definitions::from_config(config).unwrap()
}
