//! Configuration loading and parsing
//!
//! Everything is optional: with no config file the defaults produce `can.dbc`,
//! `output/` and `output/docs.md`, sources are generated with cantools and the
//! documentation by the built-in Markdown writer.

use anyhow::{Context, Result};
use can_messages::CompilerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: CompilerConfig,
    #[serde(default = "default_codegen")]
    pub codegen: CommandConfig,
    /// Replaces the built-in Markdown writer when set
    #[serde(default)]
    pub docs: CommandConfig,
}

/// An external command with `{database}` and `{output}` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandConfig {
    #[serde(default)]
    pub command: Vec<String>,
}

impl CommandConfig {
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }

    /// Command line with placeholders replaced
    pub fn render(&self, database: &Path, output: &Path) -> Vec<String> {
        let database = database.display().to_string();
        let output = output.display().to_string();
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{database}", &database)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

fn default_codegen() -> CommandConfig {
    CommandConfig::new([
        "cantools",
        "generate_c_source",
        "{database}",
        "-o",
        "{output}",
    ])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: CompilerConfig::default(),
            codegen: default_codegen(),
            docs: CommandConfig::default(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
