use anyhow::{Context, Result};
use std::{
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

/// Launch `exe` with `args` and block until it exits. With `elevate` the
/// host platform is asked for elevated privileges; a declined prompt
/// surfaces as a launch failure or a non-zero exit, depending on the
/// platform. Callers are expected to block on a worker thread, not on the
/// interaction context.
pub fn run_and_wait(exe: &Path, args: &[&str], elevate: bool) -> Result<ExitStatus> {
    if elevate {
        return run_elevated(exe, args);
    }
    let mut cmd = Command::new(exe);
    cmd.args(args).stdin(Stdio::null());
    cmd.status().with_context(|| format!("run {}", exe.display()))
}

#[cfg(windows)]
fn run_elevated(exe: &Path, args: &[&str]) -> Result<ExitStatus> {
    let target = ps_quote(&exe.display().to_string());
    let mut script = format!("$p = Start-Process -FilePath {target}");
    if !args.is_empty() {
        let list = args
            .iter()
            .map(|arg| ps_quote(arg))
            .collect::<Vec<_>>()
            .join(", ");
        script.push_str(&format!(" -ArgumentList {list}"));
    }
    script.push_str(" -Verb RunAs -Wait -PassThru; exit $p.ExitCode");

    Command::new("powershell")
        .arg("-NoProfile")
        .arg("-Command")
        .arg(script)
        .stdin(Stdio::null())
        .status()
        .context("run powershell")
}

#[cfg(not(windows))]
fn run_elevated(exe: &Path, args: &[&str]) -> Result<ExitStatus> {
    // No elevation broker on this platform; run the installer directly.
    let mut cmd = Command::new(exe);
    cmd.args(args).stdin(Stdio::null());
    cmd.status().with_context(|| format!("run {}", exe.display()))
}

/// Start a process, or open a document with its registered handler,
/// without waiting for it. Callers treat failures as non-fatal.
pub fn run_detached(path: &Path, use_shell_association: bool) -> Result<()> {
    if use_shell_association {
        return open_with_default_handler(path);
    }
    let mut cmd = Command::new(path);
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            cmd.current_dir(dir);
        }
    }
    cmd.spawn()
        .with_context(|| format!("launch {}", path.display()))?;
    Ok(())
}

#[cfg(windows)]
fn open_with_default_handler(path: &Path) -> Result<()> {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg("start").arg("").arg(path);
    spawn_quiet(cmd, path)
}

#[cfg(target_os = "macos")]
fn open_with_default_handler(path: &Path) -> Result<()> {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    spawn_quiet(cmd, path)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_with_default_handler(path: &Path) -> Result<()> {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    spawn_quiet(cmd, path)
}

fn spawn_quiet(mut cmd: Command, path: &Path) -> Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd.spawn()
        .with_context(|| format!("open {}", path.display()))?;
    Ok(())
}

#[cfg(windows)]
fn ps_quote(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    format!("'{}'", escaped)
}

#[cfg(test)]
mod tests {
    #[cfg(unix)]
    use super::*;
    #[cfg(unix)]
    use std::path::PathBuf;

    #[cfg(unix)]
    #[test]
    fn run_and_wait_reports_exit_codes() {
        let sh = PathBuf::from("/bin/sh");
        let ok = run_and_wait(&sh, &["-c", "exit 0"], false).unwrap();
        assert!(ok.success());

        let failed = run_and_wait(&sh, &["-c", "exit 7"], false).unwrap();
        assert_eq!(failed.code(), Some(7));
    }

    #[cfg(unix)]
    #[test]
    fn run_and_wait_errors_on_missing_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("does-not-exist");
        let err = run_and_wait(&missing, &[], false).unwrap_err();
        assert!(err.to_string().contains("run "));
    }
}
