//! Compiler output configuration
//!
//! Where the compiler collaborator places its artifacts. Paths only; what gets
//! written is decided by the [`DatabaseCompiler`](crate::compiler::DatabaseCompiler)
//! implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Artifact locations for one compiler run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Database file in DBC format (default: can.dbc)
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,

    /// Directory for generated source code (default: output)
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Markdown documentation file (default: output/docs.md)
    #[serde(default = "default_docs_file")]
    pub docs_file: PathBuf,
}

fn default_database_file() -> PathBuf {
    PathBuf::from("can.dbc")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_docs_file() -> PathBuf {
    PathBuf::from("output/docs.md")
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            source_dir: default_source_dir(),
            docs_file: default_docs_file(),
        }
    }
}

impl CompilerConfig {
    /// Create a configuration with default paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the database file path
    pub fn with_database_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_file = path.into();
        self
    }

    /// Builder method: set the source output directory
    pub fn with_source_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_dir = path.into();
        self
    }

    /// Builder method: set the documentation file path
    pub fn with_docs_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.docs_file = path.into();
        self
    }

    /// Resolve every relative path against `root`
    pub fn rooted_at(self, root: &std::path::Path) -> Self {
        Self {
            database_file: root.join(self.database_file),
            source_dir: root.join(self.source_dir),
            docs_file: root.join(self.docs_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::new();
        assert_eq!(config.database_file, PathBuf::from("can.dbc"));
        assert_eq!(config.source_dir, PathBuf::from("output"));
        assert_eq!(config.docs_file, PathBuf::from("output/docs.md"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = CompilerConfig::new()
            .with_database_file("build/robot.dbc")
            .with_source_dir("build/src")
            .with_docs_file("build/protocol.md")
            .rooted_at(Path::new("/tmp/work"));

        assert_eq!(config.database_file, PathBuf::from("/tmp/work/build/robot.dbc"));
        assert_eq!(config.source_dir, PathBuf::from("/tmp/work/build/src"));
        assert_eq!(config.docs_file, PathBuf::from("/tmp/work/build/protocol.md"));
    }
}
