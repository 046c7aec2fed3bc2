use probation_editor::{EditSession, ParameterEditStore, SynthesisDefaults, LOOP_PROVIDER_TYPE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "probation.config.json";

/// Probation configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding submitted experiment records
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Provider type that carries `loopCount` / `loopParameters`
    #[serde(default = "default_loop_provider_type")]
    pub loop_provider_type: String,

    /// Generation used when a synthesized document has none
    #[serde(default = "default_generation")]
    pub default_generation: String,

    #[serde(default = "default_experiment_name")]
    pub default_experiment_name: String,
}

fn default_store_dir() -> String {
    ".probation/experiments".to_string()
}

fn default_loop_provider_type() -> String {
    LOOP_PROVIDER_TYPE.to_string()
}

fn default_generation() -> String {
    SynthesisDefaults::default().generation
}

fn default_experiment_name() -> String {
    SynthesisDefaults::default().experiment_name
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute path to the experiment store
    pub fn store_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.store_dir)
    }

    pub fn synthesis_defaults(&self) -> SynthesisDefaults {
        SynthesisDefaults {
            experiment_name: self.default_experiment_name.clone(),
            generation: self.default_generation.clone(),
        }
    }

    /// Fresh edit session wired to this configuration
    pub fn session(&self) -> EditSession {
        EditSession::with_store(ParameterEditStore::with_loop_provider_type(
            self.loop_provider_type.clone(),
        ))
        .with_defaults(self.synthesis_defaults())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            loop_provider_type: default_loop_provider_type(),
            default_generation: default_generation(),
            default_experiment_name: default_experiment_name(),
        }
    }
}
