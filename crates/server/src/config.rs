//! Startup configuration
//!
//! Everything the server needs is collected into one `Config` at startup and
//! handed to the router through `AppState`. Nothing is read from the
//! environment after that point.

use anyhow::Context;
use rand::Rng;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub secret_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Read the signing secret from `path`, generating and saving a new one if the
/// file does not exist yet.
pub fn load_or_create_secret(path: &Path) -> anyhow::Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(contents) => {
            let secret = contents.trim_ascii();
            if secret.is_empty() {
                anyhow::bail!("secret key file {} is empty", path.display());
            }
            info!("Loaded secret key from {}", path.display());
            Ok(secret.to_vec())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No secret key at {}, generating a new one", path.display());
            let bytes: [u8; 32] = rand::thread_rng().gen();
            let secret = hex::encode(bytes);

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, &secret)
                .with_context(|| format!("writing secret key to {}", path.display()))?;

            Ok(secret.into_bytes())
        }
        Err(e) => Err(e).with_context(|| format!("reading secret key from {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "competition-board-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_secret_generated_then_reused() {
        let dir = scratch_dir("secret");
        let path = dir.join("secret_key");

        let first = load_or_create_secret(&path).unwrap();
        assert_eq!(first.len(), 64);
        assert!(path.exists());

        let second = load_or_create_secret(&path).unwrap();
        assert_eq!(first, second);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_existing_secret_is_trimmed() {
        let dir = scratch_dir("secret-trim");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("secret_key");
        std::fs::write(&path, "hunter2\n").unwrap();

        assert_eq!(load_or_create_secret(&path).unwrap(), b"hunter2".to_vec());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_binary_secret_accepted() {
        let dir = scratch_dir("secret-binary");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("secret_key");
        let raw = [0xffu8, 0xfe, 0x00, 0x80, b'k', 0xc3];
        std::fs::write(&path, raw).unwrap();

        assert_eq!(load_or_create_secret(&path).unwrap(), raw.to_vec());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_secret_rejected() {
        let dir = scratch_dir("secret-empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("secret_key");
        std::fs::write(&path, "  \n").unwrap();

        assert!(load_or_create_secret(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bind_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 5000,
            db_path: PathBuf::from("data/competition.db"),
            secret_path: PathBuf::from("data/secret_key"),
            static_dir: PathBuf::from("static"),
        };
        assert_eq!(config.bind_addr().unwrap().port(), 5000);

        let bad = Config {
            host: "not a host".to_string(),
            ..config
        };
        assert!(bad.bind_addr().is_err());
    }
}
