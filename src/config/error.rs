//! Errors raised while loading `sluice.toml`.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML")]
    Toml(#[from] toml::de::Error),

    /// Rendered in full by `Display`; no `source()` to avoid printing it twice.
    #[error("{0}")]
    Invalid(ConfigDiagnostics),
}

/// One problem with one config field, e.g. `vendors.js.src`.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub field: String,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " {}", format!("({hint})").dimmed())?;
        }
        Ok(())
    }
}

/// Problems collected across every section, so one run reports them all.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
    warnings: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(diagnostic(field, message, None));
    }

    pub fn error_with_hint(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.errors.push(diagnostic(field, message, Some(hint.into())));
    }

    pub fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(diagnostic(field, message, None));
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    #[cfg(test)]
    pub fn warnings(&self) -> &[ConfigDiagnostic] {
        &self.warnings
    }

    /// Log the warnings, then fail if any error was recorded.
    pub fn finish(self) -> Result<(), ConfigError> {
        for warning in &self.warnings {
            crate::log!("warning"; "{}", warning);
        }
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self))
        }
    }
}

fn diagnostic(field: impl Into<String>, message: impl Into<String>, hint: Option<String>) -> ConfigDiagnostic {
    ConfigDiagnostic {
        field: field.into(),
        message: message.into(),
        hint,
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.errors.len();
        let noun = if count == 1 { "problem" } else { "problems" };
        write!(f, "{}", format!("sluice.toml has {count} {noun}:").red().bold())?;
        for err in &self.errors {
            write!(f, "\n  {} {err}", "•".red())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}
