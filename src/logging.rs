//! Tracing setup.
//!
//! The TUI owns the terminal, so events go to a file that is truncated on
//! every launch. `RUST_LOG` picks the filter; the default is `info`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "sqlpeek.log";

/// Installs the global subscriber writing to [`get_log_path`].
///
/// Returns the path in use. Failing to create the file leaves logging off.
pub fn init_file_logging() -> io::Result<PathBuf> {
    let path = get_log_path();
    let file = open_truncated(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(path)
}

/// State dir, else config dir, else temp dir.
pub fn get_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|base| base.join("sqlpeek").join(LOG_FILE))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE))
}

fn open_truncated(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_path_is_absolute_log_file() {
        let path = get_log_path();
        assert!(path.is_absolute());
        assert!(path.ends_with(LOG_FILE));
    }

    #[test]
    fn test_open_truncated_creates_parents_and_clears_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(LOG_FILE);

        let mut file = open_truncated(&path).unwrap();
        writeln!(file, "previous run").unwrap();
        drop(file);

        open_truncated(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
