use super::*;
use tempfile::TempDir;

fn touch(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"transient").unwrap();
    path
}

#[test]
fn release_all_removes_every_tracked_file() {
    let dir = TempDir::new().unwrap();
    let a = touch(&dir, "a.jpg");
    let b = touch(&dir, "b.jpg");

    let mut reaper = ResourceReaper::new();
    reaper.track(&a);
    reaper.track(&b);
    assert_eq!(reaper.tracked(), 2);

    reaper.release_all();
    assert_eq!(reaper.tracked(), 0);
    assert!(!a.exists());
    assert!(!b.exists());
}

#[test]
fn missing_files_are_ignored() {
    let mut reaper = ResourceReaper::new();
    reaper.track("/nonexistent/veriface-gone.jpg");
    reaper.release_all();
    assert_eq!(reaper.tracked(), 0);
}

#[test]
fn release_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let a = touch(&dir, "a.jpg");

    let mut reaper = ResourceReaper::new();
    reaper.track(&a);
    reaper.release_all();
    reaper.release_all();
    assert!(!a.exists());
}

#[test]
fn drop_releases_tracked_files() {
    let dir = TempDir::new().unwrap();
    let a = touch(&dir, "a.jpg");

    {
        let mut reaper = ResourceReaper::new();
        reaper.track(&a);
    }
    assert!(!a.exists());
}

#[test]
fn drop_releases_even_when_unwinding() {
    let dir = TempDir::new().unwrap();
    let a = touch(&dir, "a.jpg");
    let path = a.clone();

    let result = std::panic::catch_unwind(move || {
        let mut reaper = ResourceReaper::new();
        reaper.track(&path);
        panic!("mid-pipeline failure");
    });
    assert!(result.is_err());
    assert!(!a.exists());
}
