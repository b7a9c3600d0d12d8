//! Process-environment boundary for the request builder and cache.
//!
//! Everything the pipeline reads from the surrounding process — whether
//! stdin is a terminal, stdin/file contents, the home directory — goes
//! through this trait so tests can run deterministically without touching
//! the real process state.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

pub trait Environment {
    /// Whether standard input is attached to an interactive terminal.
    /// `false` means piped input is present.
    fn stdin_is_tty(&self) -> bool;

    /// Read standard input to end of stream.
    fn read_stdin(&self) -> io::Result<Vec<u8>>;

    /// Read a whole file into memory.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// The user's home (POSIX) or profile (Windows) directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// [`Environment`] backed by the real process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn stdin_is_tty(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_stdin(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// Expand a leading `~` against the environment's home directory.
///
/// Paths without the prefix, or environments without a home directory,
/// pass through unchanged.
pub fn resolve_home_path(filepath: &str, env: &dyn Environment) -> PathBuf {
    if let Some(rest) = filepath.strip_prefix('~') {
        if let Some(home) = env.home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(filepath)
}
