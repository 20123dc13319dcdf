//! Fn listener configuration.
//!
//! Inside the Fn runtime the listener comes from `FN_LISTENER`
//! (`unix:/tmp/iofs/lsnr.sock`). Outside of it the function can be served on
//! a plain TCP address for local testing.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener address in Fn format (`unix:/path/to.sock`).
    /// Takes precedence over `host`/`port` when set.
    #[serde(default)]
    pub listener: Option<String>,

    /// TCP host used when no listener is configured.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// TCP port used when no listener is configured.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Unix socket path from the listener, if it uses the `unix:` scheme.
    pub fn unix_socket_path(&self) -> Option<&str> {
        self.listener.as_deref()?.strip_prefix("unix:")
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}
