use serde::Deserialize;
use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
struct Config {
    app_id: String,
    name: String,
    product_name: String,
    company: String,
    description: String,
    version: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    install_dir: String,
    payload: PayloadConfig,
}

#[derive(Debug, Deserialize)]
struct PayloadConfig {
    files: Vec<String>,
    app_exe: String,
    readme: String,
    #[serde(default)]
    prerequisite: String,
    #[serde(default)]
    prerequisite_args: Vec<String>,
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let manifest_dir = PathBuf::from(manifest_dir);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR not set"));

    let config = load_config(&manifest_dir).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });

    if let Err(err) = pack_payload(&manifest_dir.join("payload"), &out_dir.join("payload.zip")) {
        panic!("failed to pack payload: {err}");
    }

    if std::env::var_os("CARGO_CFG_WINDOWS").is_some() {
        if let Err(err) = embed_resources(&manifest_dir, &config) {
            panic!("failed to embed resources: {err}");
        }
    }

    if let Err(err) = write_config_rs(&out_dir, &config) {
        panic!("failed to write config: {err}");
    }
}

fn load_config(manifest_dir: &Path) -> io::Result<Config> {
    let config_path = manifest_dir.join("config.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let contents = fs::read_to_string(&config_path)?;
    let cfg: Config = toml::from_str(&contents)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(cfg)
}

// Top-level files only: the engine writes the payload flat into the
// destination folder.
fn pack_payload(payload_dir: &Path, archive_path: &Path) -> io::Result<()> {
    println!("cargo:rerun-if-changed={}", payload_dir.display());

    let mut file_paths: Vec<PathBuf> = Vec::new();
    if payload_dir.exists() {
        for entry in fs::read_dir(payload_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                file_paths.push(entry.path());
            }
        }
    }
    file_paths.sort();

    let archive = fs::File::create(archive_path)?;
    let mut zip = zip::ZipWriter::new(archive);
    let options = zip::write::FileOptions::default();
    for path in file_paths {
        println!("cargo:rerun-if-changed={}", path.display());
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "non-utf8 payload name"))?
            .to_string();
        zip.start_file(name, options)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut src = fs::File::open(&path)?;
        io::copy(&mut src, &mut zip)?;
    }
    zip.finish()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    Ok(())
}

fn embed_resources(manifest_dir: &Path, config: &Config) -> io::Result<()> {
    let mut res = winres::WindowsResource::new();
    if let Some(icon_path) = resolve_icon_path(manifest_dir, config) {
        res.set_icon(icon_path.to_string_lossy().as_ref());
    }
    if !config.product_name.is_empty() {
        res.set("ProductName", &config.product_name);
    }
    if !config.description.is_empty() {
        res.set("FileDescription", &config.description);
    }
    if !config.company.is_empty() {
        res.set("CompanyName", &config.company);
    }
    if !config.version.is_empty() {
        res.set("FileVersion", &config.version);
        res.set("ProductVersion", &config.version);
    }
    if !config.app_id.is_empty() {
        res.set("InternalName", &config.app_id);
    }
    res.compile()?;
    Ok(())
}

fn resolve_icon_path(manifest_dir: &Path, config: &Config) -> Option<PathBuf> {
    if !config.icon.is_empty() {
        let candidate = manifest_dir.join(&config.icon);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    let assets_dir = manifest_dir.join("assets");
    if !assets_dir.exists() {
        return None;
    }
    let mut ico_paths: Vec<PathBuf> = fs::read_dir(&assets_dir).ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e.eq_ignore_ascii_case("ico")).unwrap_or(false))
        .collect();
    ico_paths.sort();
    ico_paths.first().cloned()
}

fn write_config_rs(out_dir: &Path, config: &Config) -> io::Result<()> {
    use std::io::Write;
    let out_path = out_dir.join("skiff_config.rs");
    let mut file = fs::File::create(&out_path)?;
    writeln!(file, "pub const APP_ID: &str = {:?};", config.app_id)?;
    writeln!(file, "pub const NAME: &str = {:?};", config.name)?;
    writeln!(file, "pub const PRODUCT_NAME: &str = {:?};", config.product_name)?;
    writeln!(file, "pub const VERSION: &str = {:?};", config.version)?;
    writeln!(file, "pub const DEFAULT_INSTALL_DIR: &str = {:?};", config.install_dir)?;
    writeln!(file, "pub const PAYLOAD_FILES: &[&str] = &{:?};", config.payload.files)?;
    writeln!(file, "pub const APP_EXE: &str = {:?};", config.payload.app_exe)?;
    writeln!(file, "pub const README_FILE: &str = {:?};", config.payload.readme)?;
    writeln!(file, "pub const PREREQ_INSTALLER: &str = {:?};", config.payload.prerequisite)?;
    writeln!(file, "pub const PREREQ_ARGS: &[&str] = &{:?};", config.payload.prerequisite_args)?;
    Ok(())
}
