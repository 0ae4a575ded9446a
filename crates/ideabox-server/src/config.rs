use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let port = var("PORT", "3000");
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid PORT value '{port}'"))?;

        Ok(Self {
            host: var("IDEABOX_HOST", "0.0.0.0"),
            port,
            db_path: var("IDEABOX_DB_PATH", "activities.db").into(),
            static_dir: var("IDEABOX_STATIC_DIR", "public").into(),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_path, PathBuf::from("activities.db"));
        assert_eq!(cfg.static_dir, PathBuf::from("public"));
        assert_eq!(cfg.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn port_override() {
        let cfg = config(&[("PORT", "8080"), ("IDEABOX_HOST", "127.0.0.1")]).unwrap();
        assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bad_port_is_error() {
        assert!(config(&[("PORT", "eighty")]).is_err());
    }
}
