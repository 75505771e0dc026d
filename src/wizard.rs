use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::{
    config,
    engine::{self, EngineEvent, InstallConfig},
    logging, payload, paths, process, shortcuts,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOptions {
    pub destination: Option<PathBuf>,
    pub install_prerequisite: bool,
    pub create_shortcut: bool,
    pub launch_app: bool,
    pub open_readme: bool,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            destination: None,
            install_prerequisite: true,
            create_shortcut: false,
            launch_app: false,
            open_readme: false,
        }
    }
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;
    run_with_options(options)
}

pub fn parse_args(args: &[String]) -> Result<WizardOptions> {
    let mut options = WizardOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dest" => {
                let Some(value) = iter.next() else {
                    bail!("--dest requires a path");
                };
                options.destination = Some(PathBuf::from(value));
            }
            "--skip-runtime" => options.install_prerequisite = false,
            "--shortcut" => options.create_shortcut = true,
            "--launch" => options.launch_app = true,
            "--readme" => options.open_readme = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(options)
}

pub fn run_with_options(options: WizardOptions) -> Result<()> {
    let log_path = logging::init()?;
    let destination = match options.destination.clone() {
        Some(dest) => dest,
        None => paths::default_destination()?,
    };
    let install = InstallConfig {
        destination: destination.clone(),
        install_prerequisite: options.install_prerequisite,
    };

    println!("{} {} setup", config::PRODUCT_NAME, config::VERSION);
    println!("Installing to {}", destination.display());
    let _ = logging::log_line(&log_path, &format!("installing to {}", destination.display()));

    let events = engine::spawn_run(payload::embedded(), install);
    let mut failure = None;
    for event in events {
        match event {
            EngineEvent::Phase(phase) => {
                let _ = logging::log_line(&log_path, &format!("phase: {phase:?}"));
            }
            EngineEvent::Progress(report) => {
                println!("[{:>3}%] {}", report.percent, report.step);
                let _ = logging::log_line(
                    &log_path,
                    &format!("[{:>3}%] {}", report.percent, report.step),
                );
            }
            EngineEvent::Warning(message) => {
                eprintln!("warning: {message}");
                let _ = logging::log_line(&log_path, &format!("warning: {message}"));
            }
            EngineEvent::Done(error) => failure = error,
        }
    }
    if let Some(reason) = failure {
        let _ = logging::log_line(&log_path, &format!("failed: {reason}"));
        bail!("installation failed: {reason}");
    }
    let _ = logging::log_line(&log_path, "completed");

    run_post_install_actions(&options, &destination);
    println!("Done. Log: {}", log_path.display());
    Ok(())
}

/// Post-install actions are best effort: the install is already complete,
/// so a failure here becomes a warning, never an installer failure.
fn run_post_install_actions(options: &WizardOptions, destination: &Path) {
    let app_exe = destination.join(config::APP_EXE);

    if options.create_shortcut {
        let created = shortcuts::default_desktop_dir()
            .and_then(|dir| shortcuts::create_desktop_shortcut(&dir, config::PRODUCT_NAME, &app_exe));
        match created {
            Ok(link) => println!("Created shortcut {}", link.display()),
            Err(err) => eprintln!("warning: could not create shortcut: {err:#}"),
        }
    }

    if options.open_readme {
        let readme = destination.join(config::README_FILE);
        if readme.exists() {
            if let Err(err) = process::run_detached(&readme, true) {
                eprintln!("warning: could not open {}: {err:#}", config::README_FILE);
            }
        }
    }

    if options.launch_app && app_exe.exists() {
        if let Err(err) = process::run_detached(&app_exe, false) {
            eprintln!("warning: could not launch {}: {err:#}", config::PRODUCT_NAME);
        }
    }
}
