use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Conventional desktop folder for the current user.
pub fn default_desktop_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let profile = std::env::var("USERPROFILE").context("USERPROFILE not set")?;
        Ok(PathBuf::from(profile).join("Desktop"))
    }
    #[cfg(not(windows))]
    {
        let home = std::env::var("HOME").context("HOME not set")?;
        Ok(PathBuf::from(home).join("Desktop"))
    }
}

pub fn shortcut_path(desktop_dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() {
        bail!("shortcut name is empty");
    }
    #[cfg(windows)]
    {
        Ok(desktop_dir.join(format!("{name}.lnk")))
    }
    #[cfg(not(windows))]
    {
        Ok(desktop_dir.join(format!("{name}.desktop")))
    }
}

/// Create a desktop shortcut pointing at `target`, with the working
/// directory set to the folder containing `target`. Overwrites any
/// previous shortcut with the same name.
pub fn create_desktop_shortcut(desktop_dir: &Path, name: &str, target: &Path) -> Result<PathBuf> {
    let link_path = shortcut_path(desktop_dir, name)?;
    std::fs::create_dir_all(desktop_dir)
        .with_context(|| format!("create {}", desktop_dir.display()))?;

    let workdir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    write_shortcut(&link_path, name, target, &workdir)?;
    Ok(link_path)
}

#[cfg(windows)]
fn write_shortcut(link_path: &Path, _name: &str, target: &Path, workdir: &Path) -> Result<()> {
    use std::process::Command;

    let lnk = ps_quote(&link_path.display().to_string());
    let tgt = ps_quote(&target.display().to_string());
    let dir = ps_quote(&workdir.display().to_string());

    let script = format!(
        "$WshShell = New-Object -ComObject WScript.Shell; \
         $Shortcut = $WshShell.CreateShortcut({lnk}); \
         $Shortcut.TargetPath = {tgt}; \
         $Shortcut.WorkingDirectory = {dir}; \
         $Shortcut.Save();"
    );

    let status = Command::new("powershell")
        .arg("-NoProfile")
        .arg("-Command")
        .arg(script)
        .status()
        .context("run powershell")?;

    if !status.success() {
        bail!("failed to create shortcut (exit {:?})", status.code());
    }
    Ok(())
}

#[cfg(not(windows))]
fn write_shortcut(link_path: &Path, name: &str, target: &Path, workdir: &Path) -> Result<()> {
    let entry = format!(
        "[Desktop Entry]\nType=Application\nName={name}\nExec={}\nPath={}\nTerminal=false\n",
        target.display(),
        workdir.display()
    );
    std::fs::write(link_path, entry)
        .with_context(|| format!("write {}", link_path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(link_path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(link_path, perms)?;
    }
    Ok(())
}

#[cfg(windows)]
fn ps_quote(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    format!("'{}'", escaped)
}
