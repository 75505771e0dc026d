use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config;

/// Destination used when the user does not pick a folder: the configured
/// install dir, or `<user data dir>/<product name>`.
pub fn default_destination() -> Result<PathBuf> {
    destination_for(config::DEFAULT_INSTALL_DIR, config::PRODUCT_NAME)
}

fn destination_for(configured: &str, product: &str) -> Result<PathBuf> {
    let configured = configured.trim();
    if !configured.is_empty() {
        let base = PathBuf::from(configured);
        if base.is_absolute() {
            return Ok(base);
        }
        return Ok(data_root()?.join(base));
    }
    Ok(data_root()?.join(product))
}

#[cfg(windows)]
fn data_root() -> Result<PathBuf> {
    let local = std::env::var("LOCALAPPDATA").context("LOCALAPPDATA not set")?;
    Ok(PathBuf::from(local))
}

#[cfg(not(windows))]
fn data_root() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".local").join("share"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[cfg(not(windows))]
    fn with_data_root_env<T>(value: &std::path::Path, body: impl FnOnce() -> T) -> T {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prior = std::env::var("HOME").ok();
        std::env::set_var("HOME", value);
        let out = body();
        if let Some(v) = prior {
            std::env::set_var("HOME", v);
        } else {
            std::env::remove_var("HOME");
        }
        out
    }

    #[cfg(windows)]
    fn with_data_root_env<T>(value: &std::path::Path, body: impl FnOnce() -> T) -> T {
        let _guard = ENV_MUTEX.lock().unwrap();
        let prior = std::env::var("LOCALAPPDATA").ok();
        std::env::set_var("LOCALAPPDATA", value);
        let out = body();
        if let Some(v) = prior {
            std::env::set_var("LOCALAPPDATA", v);
        } else {
            std::env::remove_var("LOCALAPPDATA");
        }
        out
    }

    #[test]
    fn empty_config_uses_product_under_data_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = with_data_root_env(tmp.path(), || destination_for("", "MyApp").unwrap());
        #[cfg(not(windows))]
        assert_eq!(dest, tmp.path().join(".local").join("share").join("MyApp"));
        #[cfg(windows)]
        assert_eq!(dest, tmp.path().join("MyApp"));
    }

    #[test]
    fn relative_config_is_joined_to_data_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = with_data_root_env(tmp.path(), || destination_for("vendor/apps", "MyApp").unwrap());
        assert!(dest.ends_with(PathBuf::from("vendor").join("apps")));
    }

    #[test]
    fn absolute_config_is_used_as_is() {
        let tmp = tempfile::tempdir().unwrap();
        let configured = tmp.path().join("opt").join("myapp");
        let dest = destination_for(configured.to_str().unwrap(), "MyApp").unwrap();
        assert_eq!(dest, configured);
    }
}
