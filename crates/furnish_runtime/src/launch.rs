//! Launch options
//!
//! `furnish [config.toml] [script.toml]`
//!
//! The config path comes from the first argument, then the
//! `FURNISH_CONFIG` environment variable, then the built-in defaults.
//! Without a script the built-in walkthrough runs.

use std::path::PathBuf;

use furnish_interaction::InteractionConfig;

use crate::error::ScriptResult;
use crate::script::Script;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "FURNISH_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Launch {
    pub config_path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
}

impl Launch {
    /// Resolve paths from arguments (program name already stripped) and
    /// the value of [`CONFIG_ENV`]
    pub fn from_args<I>(args: I, env_config: Option<String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().filter(|a| !a.is_empty());
        let config_path = args
            .next()
            .or(env_config.filter(|v| !v.is_empty()))
            .map(PathBuf::from);
        let script_path = args.next().map(PathBuf::from);

        Self {
            config_path,
            script_path,
        }
    }

    pub fn config(&self) -> ScriptResult<InteractionConfig> {
        match &self.config_path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Ok(InteractionConfig::load(path)?)
            }
            None => {
                log::info!("Using default config");
                Ok(InteractionConfig::default())
            }
        }
    }

    pub fn script(&self) -> ScriptResult<Script> {
        match &self.script_path {
            Some(path) => {
                log::info!("Replaying {}", path.display());
                Script::load(path)
            }
            None => {
                log::info!("No script given, running the walkthrough");
                Script::walkthrough()
            }
        }
    }
}
