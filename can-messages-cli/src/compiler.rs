//! Compiler collaborator backed by external tools
//!
//! The DBC file and the Markdown documentation are written in-process; source
//! generation runs the command configured in [`AppConfig`](crate::config::AppConfig).
//! A configured docs command replaces the built-in Markdown writer.

use crate::config::CommandConfig;
use can_messages::{dbc, docs, CanDbError, Database, DatabaseCompiler, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs external generators after writing the database file
pub struct ExternalCompiler {
    database_file: PathBuf,
    codegen: CommandConfig,
    docs: CommandConfig,
}

impl ExternalCompiler {
    pub fn new(database_file: PathBuf, codegen: CommandConfig, docs: CommandConfig) -> Self {
        Self {
            database_file,
            codegen,
            docs,
        }
    }

    fn run(&self, step: &str, command: &CommandConfig, database: &Path, output: &Path) -> Result<()> {
        if command.is_empty() {
            log::warn!("No {} command configured, skipping", step);
            return Ok(());
        }

        let args = command.render(database, output);
        log::debug!("Running {}: {:?}", step, args);

        let status = Command::new(&args[0])
            .args(&args[1..])
            .status()
            .map_err(|e| CanDbError::Collaborator(format!("{} ({}): {}", step, args[0], e)))?;

        if !status.success() {
            return Err(CanDbError::Collaborator(format!(
                "{} command {:?} exited with {}",
                step, args, status
            )));
        }

        Ok(())
    }
}

impl DatabaseCompiler for ExternalCompiler {
    fn serialize_to_database_file(&self, database: &Database) -> Result<Vec<u8>> {
        Ok(dbc::write_dbc(database)?.into_bytes())
    }

    fn generate_source_code(&self, database_file: &Path, output_dir: &Path) -> Result<()> {
        self.run("source generation", &self.codegen, database_file, output_dir)
    }

    fn generate_documentation(&self, database: &Database, output_path: &Path) -> Result<()> {
        if !self.docs.is_empty() {
            return self.run("documentation", &self.docs, &self.database_file, output_path);
        }
        fs::write(output_path, docs::write_markdown(database)?)?;
        Ok(())
    }
}
