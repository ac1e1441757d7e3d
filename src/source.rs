use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory holding the flag tables shipped with this crate; [DirectorySource::default] reads
/// from it regardless of the working directory.
pub const DATA_DIRECTORY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// File extension of a flag table definition.
pub const FLAG_TABLE_EXTENSION: &str = "json";

/// Source is an interface for reading the raw definition of an environment's flag table.
///
/// Implementations must return current content on every call and report a definition that
/// does not exist as an error of kind [io::ErrorKind::NotFound].
pub trait Source {
    /// Read the definition for `environment`.
    fn read(&self, environment: &str) -> io::Result<String>;
}

/// Reads `<base>/<environment>.json` straight from the file system.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    base: PathBuf,
}

impl DirectorySource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn path_for(&self, environment: &str) -> PathBuf {
        self.base.join(format!("{}.{}", environment, FLAG_TABLE_EXTENSION))
    }
}

impl Default for DirectorySource {
    fn default() -> Self {
        Self::new(DATA_DIRECTORY)
    }
}

impl Source for DirectorySource {
    fn read(&self, environment: &str) -> io::Result<String> {
        fs::read_to_string(self.path_for(environment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectral::prelude::*;

    #[test]
    fn default_reads_from_data_directory() {
        let source = DirectorySource::default();
        assert_that!(source.base().is_absolute()).is_true();
        assert_that!(source.path_for("builtin"))
            .is_equal_to(Path::new(DATA_DIRECTORY).join("builtin.json"));
    }

    #[test]
    fn default_does_not_depend_on_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let previous = std::env::current_dir().unwrap();

        std::env::set_current_dir(dir.path()).unwrap();
        let result = DirectorySource::default().read("builtin");
        std::env::set_current_dir(previous).unwrap();

        assert_that!(result).is_ok();
    }

    #[test]
    fn dotted_environment_keeps_its_name() {
        let source = DirectorySource::new("tables");
        assert_that!(source.path_for("es2015.beta"))
            .is_equal_to(Path::new("tables/es2015.beta.json").to_path_buf());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        let err = source.read("nonexistent").unwrap_err();

        assert_that!(err.kind()).is_equal_to(io::ErrorKind::NotFound);
    }

    #[test]
    fn reads_current_content() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        let path = source.path_for("node");

        fs::write(&path, r#"{"process": false}"#).unwrap();
        assert_that!(source.read("node").unwrap()).is_equal_to(r#"{"process": false}"#.to_string());

        fs::write(&path, r#"{"process": true}"#).unwrap();
        assert_that!(source.read("node").unwrap()).is_equal_to(r#"{"process": true}"#.to_string());
    }

    #[test]
    fn shipped_tables_are_readable() {
        let source = DirectorySource::default();
        assert_that!(source.read("builtin")).is_ok();
        assert_that!(source.read("es2015")).is_ok();
    }
}
