use anyhow::{bail, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitStatus,
    thread,
};

use crate::{
    config, fs_ops,
    payload::{PayloadError, PayloadStore},
    process, state,
};

/// Everything the engine needs for one install run. Immutable once handed
/// to `run`.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub destination: PathBuf,
    pub install_prerequisite: bool,
}

/// Read-only snapshot of the step in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub step: String,
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    EnsuringDestination,
    InstallingPrerequisite,
    ExtractingFiles,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Phase(EnginePhase),
    Progress(ProgressReport),
    Warning(String),
    /// Terminal outcome, sent exactly once per spawned run. `None` is
    /// success; `Some(reason)` is a failure the wizard must show.
    Done(Option<String>),
}

/// Run the engine on a worker thread so the interaction context stays
/// responsive. The returned channel closes after the `Done` event.
pub fn spawn_run(store: PayloadStore, config: InstallConfig) -> Receiver<EngineEvent> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let result = run(&store, &config, &tx);
        let _ = tx.send(EngineEvent::Done(result.err().map(|err| format!("{err:#}"))));
    });
    rx
}

pub fn run(store: &PayloadStore, config: &InstallConfig, events: &Sender<EngineEvent>) -> Result<()> {
    run_with_deps(
        store,
        config,
        config::PAYLOAD_FILES,
        config::PREREQ_INSTALLER,
        events,
        |installer| process::run_and_wait(installer, config::PREREQ_ARGS, true),
    )
}

/// The step sequence with the prerequisite launcher injected, so tests
/// never spawn real processes. Steps run strictly in order; a fatal error
/// aborts the run, a warning never does.
pub fn run_with_deps(
    store: &PayloadStore,
    config: &InstallConfig,
    files: &[&str],
    prereq_name: &str,
    events: &Sender<EngineEvent>,
    mut run_prereq: impl FnMut(&Path) -> Result<ExitStatus>,
) -> Result<()> {
    let result = (|| -> Result<()> {
        emit(events, EngineEvent::Phase(EnginePhase::EnsuringDestination));
        emit_progress(events, "Preparing destination folder...", 0);
        ensure_destination(&config.destination)?;

        let mut prerequisite_installed = false;
        if config.install_prerequisite {
            emit(events, EngineEvent::Phase(EnginePhase::InstallingPrerequisite));
            prerequisite_installed =
                install_prerequisite(store, prereq_name, events, &mut run_prereq);
        }

        emit(events, EngineEvent::Phase(EnginePhase::ExtractingFiles));
        let extracted = extract_files(store, &config.destination, files, events)?;

        let record = state::InstallRecord {
            product: config::PRODUCT_NAME.to_string(),
            version: config::VERSION.to_string(),
            files: extracted,
            prerequisite_installed,
        };
        if let Err(err) = state::write_record(&state::record_path(&config.destination), &record) {
            emit(
                events,
                EngineEvent::Warning(format!("could not write install record: {err:#}")),
            );
        }

        emit_progress(events, "Installation complete", 100);
        emit(events, EngineEvent::Phase(EnginePhase::Completed));
        Ok(())
    })();

    if result.is_err() {
        emit(events, EngineEvent::Phase(EnginePhase::Failed));
    }
    result
}

fn ensure_destination(destination: &Path) -> Result<()> {
    if destination.as_os_str().is_empty() {
        bail!("destination path is empty");
    }
    fs::create_dir_all(destination)
        .with_context(|| format!("create destination {}", destination.display()))
}

/// Stage and run the bundled runtime installer. Nothing in here is fatal:
/// the runtime may already be present, and the bundled installer's exit
/// semantics are not trusted. Returns whether the installer ran and
/// reported success.
fn install_prerequisite(
    store: &PayloadStore,
    prereq_name: &str,
    events: &Sender<EngineEvent>,
    run_prereq: &mut impl FnMut(&Path) -> Result<ExitStatus>,
) -> bool {
    if prereq_name.is_empty() || !store.exists(prereq_name) {
        emit(
            events,
            EngineEvent::Warning("runtime installer is not bundled, skipping".to_string()),
        );
        return false;
    }

    emit_progress(events, &format!("Extracting {prereq_name}..."), 0);
    let staged = match stage_prerequisite(store, prereq_name) {
        Ok(path) => path,
        Err(err) => {
            emit(
                events,
                EngineEvent::Warning(format!("could not stage {prereq_name}: {err:#}")),
            );
            return false;
        }
    };

    emit_progress(events, "Installing runtime (this can take a few minutes)...", 0);
    let outcome = run_prereq(&staged);
    let _ = fs::remove_file(&staged);

    match outcome {
        Ok(status) if status.success() => true,
        Ok(status) => {
            emit(
                events,
                EngineEvent::Warning(format!(
                    "runtime installer exited with {:?}, continuing",
                    status.code()
                )),
            );
            false
        }
        Err(err) => {
            emit(
                events,
                EngineEvent::Warning(format!("could not run runtime installer: {err:#}")),
            );
            false
        }
    }
}

fn stage_prerequisite(store: &PayloadStore, prereq_name: &str) -> Result<PathBuf> {
    let bytes = store.read(prereq_name)?;
    let file = tempfile::Builder::new()
        .prefix("skiff-prereq-")
        .suffix(&format!("-{prereq_name}"))
        .tempfile()
        .context("create temp file for runtime installer")?;
    let (_, path) = file.keep().context("persist temp runtime installer")?;
    fs_ops::write_bytes_with_retry(&path, &bytes, 3)?;
    Ok(path)
}

fn extract_files(
    store: &PayloadStore,
    destination: &Path,
    files: &[&str],
    events: &Sender<EngineEvent>,
) -> Result<Vec<String>> {
    let total = files.len();
    let mut extracted = Vec::new();
    for (done, name) in files.iter().enumerate() {
        emit_progress(events, &format!("Copying {name}..."), pct(done, total));
        match store.extract(name, &destination.join(name)) {
            Ok(()) => extracted.push((*name).to_string()),
            Err(PayloadError::NotFound(_)) => {
                emit(
                    events,
                    EngineEvent::Warning(format!("{name} is not bundled, skipped")),
                );
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("copy {name} to {}", destination.display()));
            }
        }
        emit_progress(events, &format!("Copying {name}..."), pct(done + 1, total));
    }
    Ok(extracted)
}

fn pct(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total) as u8
}

fn emit(events: &Sender<EngineEvent>, event: EngineEvent) {
    // The consumer owning the receiver may already be gone; the install
    // itself must not care.
    let _ = events.send(event);
}

fn emit_progress(events: &Sender<EngineEvent>, step: &str, percent: u8) {
    emit(
        events,
        EngineEvent::Progress(ProgressReport {
            step: step.to_string(),
            percent,
        }),
    );
}
