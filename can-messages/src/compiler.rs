//! Compiler collaborator interface
//!
//! Turning a validated database into files (DBC text, C sources, Markdown
//! docs) is delegated to a [`DatabaseCompiler`]. [`compile`] enforces the
//! ordering: nothing reaches the collaborator until the database builds.

use crate::config::CompilerConfig;
use crate::database::{Database, DatabaseBuilder, DatabaseStats};
use crate::types::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Consumer of a validated database
pub trait DatabaseCompiler {
    /// Serialize the database into the CAN-database text format
    fn serialize_to_database_file(&self, database: &Database) -> Result<Vec<u8>>;

    /// Generate source code from a database file into `output_dir`
    fn generate_source_code(&self, database_file: &Path, output_dir: &Path) -> Result<()>;

    /// Write human-readable documentation to `output_path`
    fn generate_documentation(&self, database: &Database, output_path: &Path) -> Result<()>;
}

/// Summary of a successful compiler run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileSummary {
    pub stats: DatabaseStats,
    pub database_file: PathBuf,
    pub source_dir: PathBuf,
    pub docs_file: PathBuf,
}

/// Build the database, then hand it to the compiler collaborator
///
/// A failing build returns before the collaborator is touched, so no artifact
/// is written.
pub fn compile(
    builder: DatabaseBuilder,
    compiler: &dyn DatabaseCompiler,
    config: &CompilerConfig,
) -> Result<CompileSummary> {
    let database = builder.build()?;

    let bytes = compiler.serialize_to_database_file(&database)?;
    create_parent(&config.database_file)?;
    fs::write(&config.database_file, &bytes)?;
    log::info!(
        "Wrote database file {:?} ({} bytes)",
        config.database_file,
        bytes.len()
    );

    fs::create_dir_all(&config.source_dir)?;
    compiler.generate_source_code(&config.database_file, &config.source_dir)?;
    log::info!("Generated sources in {:?}", config.source_dir);

    create_parent(&config.docs_file)?;
    compiler.generate_documentation(&database, &config.docs_file)?;
    log::info!("Generated documentation {:?}", config.docs_file);

    Ok(CompileSummary {
        stats: database.stats(),
        database_file: config.database_file.clone(),
        source_dir: config.source_dir.clone(),
        docs_file: config.docs_file.clone(),
    })
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
