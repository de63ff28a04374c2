use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Runtime configuration, sourced from `PERISCOPE_*` environment
/// variables with defaults. CLI flags may override individual fields.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port for the WebSocket endpoint.
    pub port: u16,
    /// Hard cap on concurrent rooms.
    pub max_rooms: usize,
    /// How long an empty room survives before it is destroyed.
    pub cleanup_grace: Duration,
    /// TLS material paths. Accepted for deployment symmetry; termination
    /// itself happens at a fronting proxy.
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_rooms: 5,
            cleanup_grace: Duration::from_secs(60),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = parse_var("PERISCOPE_PORT") {
            config.port = port;
        }
        if let Some(max_rooms) = parse_var("PERISCOPE_MAX_ROOMS") {
            config.max_rooms = max_rooms;
        }
        if let Some(secs) = parse_var::<u64>("PERISCOPE_CLEANUP_GRACE_SECS") {
            config.cleanup_grace = Duration::from_secs(secs);
        }
        config.tls_cert = env::var("PERISCOPE_TLS_CERT").ok().map(PathBuf::from);
        config.tls_key = env::var("PERISCOPE_TLS_KEY").ok().map(PathBuf::from);
        config
    }
}

/// Read and parse one variable; malformed values are logged and ignored
/// so a typo falls back to the default instead of aborting startup.
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring malformed {}: {:?}", name, raw);
            None
        }
    }
}
