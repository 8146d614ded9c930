//! Launch configuration for winela.
//!
//! This module defines the structure of the `winelarc` file, which names the
//! wrapper program used to run every registry entry, and provides functions to
//! load and save it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Wrapper program used when the configuration does not name one.
pub const DEFAULT_PROGRAM: &str = "wine";

/// Invocation parameters shared by every launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Program that receives the entry path as its last argument.
    #[serde(rename = "Program")]
    pub program: String,
    /// Single extra argument placed before the entry path (empty for none).
    #[serde(rename = "Arguments")]
    pub program_args: String,
    /// Directory that relative entry paths are resolved against.
    #[serde(rename = "DefaultDir")]
    pub default_dir: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        let default_dir = dirs::home_dir()
            .map(|home| home.display().to_string())
            .unwrap_or_default();
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            program_args: String::new(),
            default_dir,
        }
    }
}

impl LaunchConfig {
    /// Restores the fallback program if the loaded value is blank.
    fn normalize(mut self) -> Self {
        if self.program.trim().is_empty() {
            self.program = DEFAULT_PROGRAM.to_string();
        }
        self
    }

    /// Applies a partial update, keeping fields that are `None`.
    pub fn update(
        &mut self,
        program: Option<String>,
        program_args: Option<String>,
        default_dir: Option<String>,
    ) -> Result<()> {
        if let Some(program) = program {
            if program.trim().is_empty() {
                bail!("program must not be empty");
            }
            self.program = program;
        }
        if let Some(args) = program_args {
            self.program_args = args;
        }
        if let Some(dir) = default_dir {
            self.default_dir = dir;
        }
        Ok(())
    }
}

/// Loads and parses the configuration from a file path.
///
/// Files that are not valid TOML are read as unquoted `Key = value` lines,
/// the format earlier releases wrote.
pub fn load_config(path: &Path) -> Result<LaunchConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = match toml::from_str::<LaunchConfig>(&raw) {
        Ok(config) => config,
        Err(err) => {
            log::warn!(
                "{} is not valid TOML ({}), reading it as plain key = value lines",
                path.display(),
                err.message()
            );
            parse_plain_config(&raw)
        }
    };
    Ok(config.normalize())
}

// Lines without exactly one `=` and unknown keys are skipped; anything not
// set keeps its default.
fn parse_plain_config(raw: &str) -> LaunchConfig {
    let mut config = LaunchConfig::default();
    for line in raw.lines() {
        let mut parts = line.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Program" => config.program = value,
            "Arguments" => config.program_args = value,
            "DefaultDir" => config.default_dir = value,
            _ => {}
        }
    }
    config
}

/// Writes the configuration to a file path, replacing its contents.
pub fn save_config(path: &Path, config: &LaunchConfig) -> Result<()> {
    let raw = toml::to_string(config).context("failed to serialize config")?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_key_names() {
        let raw = r#"
Program = "proton"
Arguments = "run"
DefaultDir = "/games"
"#;
        let config: LaunchConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.program, "proton");
        assert_eq!(config.program_args, "run");
        assert_eq!(config.default_dir, "/games");
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: LaunchConfig = toml::from_str(r#"DefaultDir = "/games""#).unwrap();
        assert_eq!(config.program, DEFAULT_PROGRAM);
        assert_eq!(config.program_args, "");
        assert_eq!(config.default_dir, "/games");
    }

    #[test]
    fn blank_program_is_restored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winelarc");
        std::fs::write(&path, "Program = \"  \"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.program, DEFAULT_PROGRAM);
    }

    #[test]
    fn loads_plain_key_value_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winelarc");
        std::fs::write(
            &path,
            "Program = wine64\nArguments = \nDefaultDir = /home/user/games\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.program, "wine64");
        assert_eq!(config.program_args, "");
        assert_eq!(config.default_dir, "/home/user/games");
    }

    #[test]
    fn plain_parse_skips_malformed_lines() {
        let config = parse_plain_config(
            "garbage line\nProgram = a = b\nUnknown = x\nArguments = --debug all\n",
        );
        assert_eq!(config.program, DEFAULT_PROGRAM);
        assert_eq!(config.program_args, "--debug all");
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winelarc");
        let config = LaunchConfig {
            program: "wine64".into(),
            program_args: "--debug all".into(),
            default_dir: "/srv/exe".into(),
        };
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn update_rejects_empty_program() {
        let mut config = LaunchConfig::default();
        assert!(config.update(Some(String::new()), None, None).is_err());
        assert_eq!(config.program, DEFAULT_PROGRAM);

        config.update(None, Some("-x".into()), None).unwrap();
        assert_eq!(config.program_args, "-x");
    }
}
