use std::fs;
use std::io::Write;
use std::path::Path;

use uuid::Uuid;

pub fn ensure_dir_exists(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

/// Replace the file at `path` with `contents` so that readers only ever see
/// the old or the new file. The temp file sits beside the target so the
/// final rename stays on one filesystem.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let temp_path = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        // Best effort, the write error is what gets reported
        let _ = fs::remove_file(&temp_path);
    }

    result
}

/// A fresh, empty directory under the system temp dir.
#[cfg(test)]
pub fn temp_data_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(Uuid::new_v4().to_string());

    fs::create_dir_all(&dir).expect("Failed to create temp dir");

    dir
}
