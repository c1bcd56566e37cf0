//! Filesystem search helpers

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Search the given directories in parallel for a file whose name matches
/// `target` case-insensitively. The first hit wins and cancels the other
/// workers; the search gives up after 30 seconds.
pub fn find_first_file_in_dirs(dirs: &[PathBuf], target: &str) -> Result<PathBuf> {
    let found = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Option<PathBuf>>();

    let mut workers = 0;
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        workers += 1;
        let dir = dir.clone();
        let target = target.to_string();
        let found = Arc::clone(&found);
        let tx = tx.clone();
        std::thread::spawn(move || {
            let hit = search_dir(&dir, &target, &found);
            if hit.is_some() {
                found.store(true, Ordering::SeqCst);
            }
            // Receiver may be gone after the first hit; that is fine.
            let _ = tx.send(hit);
        });
    }
    drop(tx);

    if workers == 0 {
        return Err(Error::NotFound(target.to_string()));
    }

    let deadline = Instant::now() + SEARCH_TIMEOUT;
    let mut remaining = workers;
    while remaining > 0 {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(Some(path)) => return Ok(path),
            Ok(None) => remaining -= 1,
            Err(_) => break,
        }
    }
    Err(Error::NotFound(target.to_string()))
}

/// Recursive scan, aborting as soon as another worker reports a hit.
fn search_dir(dir: &Path, target: &str, found: &AtomicBool) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        if found.load(Ordering::SeqCst) {
            return None;
        }
        let path = entry.path();
        if path.is_dir() {
            if let Some(hit) = search_dir(&path, target, found) {
                return Some(hit);
            }
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(target))
        {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_file_case_insensitive() {
        let dir = tempfile::TempDir::new().unwrap();
        let sub = dir.path().join("nested/deeper");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("SimSun.TTC"), b"x").unwrap();

        let hit = find_first_file_in_dirs(&[dir.path().to_path_buf()], "simsun.ttc").unwrap();
        assert_eq!(hit.file_name().unwrap(), "SimSun.TTC");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = find_first_file_in_dirs(&[dir.path().to_path_buf()], "nope.ttf");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_no_existing_dirs_is_not_found() {
        let result =
            find_first_file_in_dirs(&[PathBuf::from("/definitely/not/here")], "font.ttf");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_parallel_dirs_single_result() {
        let mut dirs = Vec::new();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let dir = tempfile::TempDir::new().unwrap();
            fs::write(dir.path().join("hit.ttf"), b"x").unwrap();
            dirs.push(dir.path().to_path_buf());
            handles.push(dir);
        }
        // Every directory matches; exactly one path must come back.
        let hit = find_first_file_in_dirs(&dirs, "hit.ttf").unwrap();
        assert_eq!(hit.file_name().unwrap(), "hit.ttf");
    }
}
