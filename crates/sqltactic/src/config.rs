//! Engine configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! dialect = "odbc"        # odbc | sqlserver | sqlite
//! table_alias = "t0"
//!
//! [command]
//! timeout_secs = 30
//! prepare = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::dialect::{Dialect, DialectKind};
use crate::error::{TacticError, TacticResult};
use crate::ident;

/// Alias given to the mapped table in SELECT commands.
pub const DEFAULT_TABLE_ALIAS: &str = "t0";

/// Execution settings stamped onto every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandOptions {
    /// Command timeout honoured by the executor. `None` uses the executor default.
    pub timeout: Option<Duration>,
    /// Ask the executor to prepare the command.
    pub prepare: bool,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_prepare(mut self, prepare: bool) -> Self {
        self.prepare = prepare;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub prepare: bool,
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Dialect tag, resolved through [`DialectKind`].
    pub dialect: String,
    #[serde(default = "default_table_alias")]
    pub table_alias: String,
    #[serde(default)]
    pub command: CommandSection,
}

fn default_table_alias() -> String {
    DEFAULT_TABLE_ALIAS.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Odbc.tag().to_string(),
            table_alias: default_table_alias(),
            command: CommandSection::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> TacticResult<Self> {
        let config: EngineConfig = toml::from_str(raw)
            .map_err(|e| TacticError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> TacticResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TacticError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            TacticError::Config(msg) => TacticError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn validate(&self) -> TacticResult<()> {
        self.dialect_kind()?;
        ident::validate_alias(&self.table_alias)
            .map_err(|e| TacticError::Config(format!("table_alias: {e}")))?;
        if self.command.timeout_secs == Some(0) {
            return Err(TacticError::Config(
                "command.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dialect_kind(&self) -> TacticResult<DialectKind> {
        self.dialect.parse()
    }

    /// The configured dialect strategy.
    pub fn dialect(&self) -> TacticResult<&'static dyn Dialect> {
        Ok(self.dialect_kind()?.dialect())
    }

    pub fn command_options(&self) -> CommandOptions {
        let options = CommandOptions::new().with_prepare(self.command.prepare);
        match self.command.timeout_secs {
            Some(secs) => options.with_timeout(Duration::from_secs(secs)),
            None => options,
        }
    }
}
