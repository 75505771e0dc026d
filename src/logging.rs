use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Create a fresh log file for this wizard run under the system temp dir.
pub fn init() -> Result<PathBuf> {
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("skiff-setup-{nonce}.log"));
    fs::write(&path, "setup log start\n").with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn log_line(path: &Path, line: &str) -> Result<()> {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    writeln!(file, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_log_file() {
        let path = init().unwrap();
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn log_line_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("run.log");

        log_line(&path, "first").unwrap();
        log_line(&path, "second").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
