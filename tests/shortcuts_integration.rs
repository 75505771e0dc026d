#[path = "../src/shortcuts.rs"]
mod shortcuts;

#[cfg(unix)]
use std::fs;

#[cfg(unix)]
#[test]
fn create_shortcut_points_at_target_with_its_folder_as_workdir() {
    let tmp = tempfile::tempdir().unwrap();
    let desktop = tmp.path().join("Desktop");
    let install = tmp.path().join("install");
    fs::create_dir_all(&install).unwrap();
    let target = install.join("app");
    fs::write(&target, "binary").unwrap();

    let link = shortcuts::create_desktop_shortcut(&desktop, "My App", &target).unwrap();

    assert!(link.exists());
    let contents = fs::read_to_string(&link).unwrap();
    assert!(contents.contains(&format!("Exec={}", target.display())));
    assert!(contents.contains(&format!("Path={}", install.display())));
}

#[cfg(unix)]
#[test]
fn create_shortcut_twice_leaves_exactly_one_shortcut() {
    let tmp = tempfile::tempdir().unwrap();
    let desktop = tmp.path().join("Desktop");
    let target = tmp.path().join("app");
    fs::write(&target, "binary").unwrap();

    let first = shortcuts::create_desktop_shortcut(&desktop, "My App", &target).unwrap();
    let second = shortcuts::create_desktop_shortcut(&desktop, "My App", &target).unwrap();

    assert_eq!(first, second);
    let entries: Vec<_> = fs::read_dir(&desktop).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
