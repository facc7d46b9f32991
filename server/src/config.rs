use clap::Parser;
use std::net::{IpAddr, SocketAddr};

// Runtime/server settings (not gameplay rules; those live in the protocol crate).

/// Longest display name kept; longer names are cut.
pub const MAX_NAME_LEN: usize = 24;

#[derive(Debug, Clone, Parser)]
#[command(name = "superfarmer-server")]
#[command(about = "Super Farmer room server")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "SUPERFARMER_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    /// Port for the websocket endpoint
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_env() {
        let cfg = ServerConfig::parse_from(["superfarmer-server", "--host", "127.0.0.1", "-p", "9001"]);
        assert_eq!(cfg.addr().to_string(), "127.0.0.1:9001");
    }
}
