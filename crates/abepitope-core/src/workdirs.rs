//! Working directories shared by the encoding and prediction stages.
use std::path::{Path, PathBuf};

/// The three hand-off directories of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDirs {
    pub encodings: PathBuf,
    pub temporary: PathBuf,
    pub output: PathBuf,
}

impl WorkDirs {
    pub fn under<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        Self {
            encodings: base.join("encodings"),
            temporary: base.join("temporary"),
            output: base.join("output"),
        }
    }

    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::under(std::env::current_dir()?))
    }

    /// Create all three directories. Existing directories are left untouched.
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [&self.encodings, &self.temporary, &self.output] {
            std::fs::create_dir_all(dir)?;
            log::debug!("Working directory ready: {}", dir.display());
        }
        Ok(())
    }
}
