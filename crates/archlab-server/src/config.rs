use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 4000;

/// Listener and CORS settings, read from the environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `ARCHLAB_HOST`, `PORT` and `ARCHLAB_ALLOWED_ORIGINS` (comma separated).
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = var("ARCHLAB_HOST")
            .and_then(|h| h.parse::<IpAddr>().ok())
            .unwrap_or(defaults.addr.ip());
        let port = var("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let allowed_origins = var("ARCHLAB_ALLOWED_ORIGINS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { addr: SocketAddr::new(host, port), allowed_origins }
    }
}
