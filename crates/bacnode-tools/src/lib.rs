pub mod host;

use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};

use bacnode_core::types::{BipMode, HostNPort};
use bacnode_server::ServerConfig;
use clap::Args;
use thiserror::Error;

pub use host::HostNetwork;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Command-line values layered over the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Device instance number.
    #[arg(long)]
    pub instance: Option<u32>,
    /// UDP port to bind and advertise.
    #[arg(long)]
    pub port: Option<u16>,
    /// IPv4 address reported by the NetworkPort object.
    #[arg(long)]
    pub ip: Option<Ipv4Addr>,
    /// Subnet mask used to compute the directed broadcast address.
    #[arg(long)]
    pub mask: Option<Ipv4Addr>,
    /// Register as a foreign device with this BBMD (`a.b.c.d:port`).
    #[arg(long)]
    pub bbmd: Option<SocketAddrV4>,
    /// Foreign-device registration time-to-live in seconds.
    #[arg(long)]
    pub ttl: Option<u16>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(instance) = self.instance {
            config.device.instance = instance;
        }
        let port = &mut config.network_port;
        if let Some(udp_port) = self.port {
            port.udp_port = udp_port;
        }
        if let Some(ip) = self.ip {
            port.ip_address = ip;
        }
        if let Some(mask) = self.mask {
            port.subnet_mask = mask;
        }
        if let Some(bbmd) = self.bbmd {
            port.ip_mode = BipMode::Foreign;
            port.fd_bbmd_address = HostNPort::ip(*bbmd.ip(), bbmd.port());
        }
        if let Some(ttl) = self.ttl {
            port.fd_subscription_lifetime = ttl;
        }
    }
}

/// Parses a JSON configuration. Missing fields take the sample defaults.
pub fn parse_config(text: &str) -> Result<ServerConfig, ConfigError> {
    Ok(serde_json::from_str(text)?)
}

/// Loads `path`, or the sample configuration when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    match path {
        None => Ok(ServerConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&text)
        }
    }
}
