//! On-disk state: the config directory and the two files inside it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{self, LaunchConfig};
use crate::registry::{self, Registry};

pub const CONFIG_FILE: &str = "winelarc";
pub const REGISTRY_FILE: &str = "wineladb";

/// Returns the per-user config directory, `<config dir>/winela`.
pub fn default_base_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("winela"))
}

/// Configuration and registry loaded from a base directory.
#[derive(Debug, Clone)]
pub struct Store {
    base_dir: PathBuf,
    pub config: LaunchConfig,
    pub registry: Registry,
}

impl Store {
    /// Opens the store under `base_dir`, creating the directory and any
    /// missing file with default contents.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create {}", base_dir.display()))?;

        let config_path = base_dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            config::load_config(&config_path)?
        } else {
            log::info!("writing default config to {}", config_path.display());
            let config = LaunchConfig::default();
            config::save_config(&config_path, &config)?;
            config
        };

        let registry_path = base_dir.join(REGISTRY_FILE);
        let registry = if registry_path.exists() {
            registry::load_registry(&registry_path)?
        } else {
            log::info!("creating empty registry at {}", registry_path.display());
            std::fs::write(&registry_path, "")
                .with_context(|| format!("failed to create {}", registry_path.display()))?;
            Registry::default()
        };

        Ok(Self {
            base_dir,
            config,
            registry,
        })
    }

    pub fn save_config(&self) -> Result<()> {
        config::save_config(&self.base_dir.join(CONFIG_FILE), &self.config)
    }

    pub fn save_registry(&self) -> Result<()> {
        registry::save_registry(&self.base_dir.join(REGISTRY_FILE), &self.registry)
    }

    /// Resolves a user-supplied entry path against the configured default
    /// directory when it is relative.
    pub fn resolve_entry_path(&self, path: &str) -> String {
        let candidate = Path::new(path);
        if candidate.is_absolute() || self.config.default_dir.is_empty() {
            return path.to_string();
        }
        Path::new(&self.config.default_dir)
            .join(candidate)
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROGRAM;
    use crate::registry::Entry;

    #[test]
    fn open_bootstraps_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested").join("winela");
        let store = Store::open(&base).unwrap();
        assert_eq!(store.config.program, DEFAULT_PROGRAM);
        assert!(store.registry.is_empty());
        assert!(base.join(CONFIG_FILE).exists());
        assert!(base.join(REGISTRY_FILE).exists());
    }

    #[test]
    fn open_reads_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "Program = \"proton\"\nArguments = \"run\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(REGISTRY_FILE),
            "[[entry]]\nname = \"Foo\"\npath = \"/bin/foo\"\n",
        )
        .unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.config.program, "proton");
        assert_eq!(store.config.program_args, "run");
        assert_eq!(store.registry.format_listing(), "1 Foo\n");
    }

    #[test]
    fn open_accepts_plain_config_and_repairs_it_on_save() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "Program = proton\nArguments = \n").unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        assert_eq!(store.config.program, "proton");
        assert_eq!(store.config.program_args, "");

        store.config.update(Some("wine".into()), None, None).unwrap();
        store.save_config().unwrap();
        let raw = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let reparsed: LaunchConfig = toml::from_str(&raw).unwrap();
        assert_eq!(reparsed.program, "wine");
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store.registry.push(Entry {
            name: "Foo".into(),
            path: "/bin/foo".into(),
        });
        store.config.program = "wine64".into();
        store.save_registry().unwrap();
        store.save_config().unwrap();

        let reopened = Store::open(dir.path()).unwrap();
        assert_eq!(reopened.config.program, "wine64");
        assert_eq!(reopened.registry, store.registry);
    }

    #[test]
    fn relative_paths_resolve_against_default_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store.config.default_dir = "/games".into();
        assert_eq!(store.resolve_entry_path("foo/setup.exe"), "/games/foo/setup.exe");
        assert_eq!(store.resolve_entry_path("/abs/setup.exe"), "/abs/setup.exe");
    }
}
