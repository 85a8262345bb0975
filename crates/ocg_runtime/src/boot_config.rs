//! Runtime configuration
//!
//! # Configuration Sources (lowest to highest priority)
//!
//! 1. Built-in defaults
//! 2. Config file: `--config <path>`, else `OCGCORE_CONFIG`, else
//!    `ocgcore.toml` in the working directory when it exists
//! 3. Environment: `OCGCORE_LIBRARY`, `OCGCORE_MAX_STEPS`, `OCGCORE_LOG_CALLS`
//! 4. First positional argument: library path
//!
//! # Example Config File
//!
//! ```toml
//! [library]
//! path = "/usr/lib/libocgcore.so"
//!
//! [duel]
//! seeds = [12345, 67890, 11111]
//! options = 0
//! max_steps = 256
//!
//! [[duel.players]]
//! lp = 8000
//! start_count = 5
//! draw_count = 1
//!
//! [trace]
//! log_calls = true
//! file = "calls.jsonl"
//! ```

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ocgcore.toml";

/// Library section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Path to libocgcore
    pub path: Option<PathBuf>,
}

/// One player's starting state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub lp: i32,
    pub start_count: i32,
    pub draw_count: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            lp: 8000,
            start_count: 5,
            draw_count: 1,
        }
    }
}

/// Duel section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// One seed uses `create_duel`, several use `create_duel_v2`
    pub seeds: Vec<u32>,
    /// Duel option flags passed to `start_duel`
    pub options: u32,
    /// Upper bound on `process` calls
    pub max_steps: u32,
    /// Players in seat order
    pub players: Vec<PlayerConfig>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            seeds: vec![0],
            options: 0,
            max_steps: 256,
            players: vec![PlayerConfig::default(), PlayerConfig::default()],
        }
    }
}

/// Trace section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Log every call through the `log` facade
    pub log_calls: bool,
    /// Append a JSON line per call to this file
    pub file: Option<PathBuf>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_calls: true,
            file: None,
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub library: LibraryConfig,
    pub duel: DuelConfig,
    pub trace: TraceConfig,
    /// File the config was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub library: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments (without the program name)
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut cli = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            if arg == "--config" || arg == "-c" {
                let path = iter
                    .next()
                    .ok_or_else(|| RuntimeError::InvalidArgs(format!("{} needs a path", arg)))?;
                cli.config = Some(PathBuf::from(path));
            } else if let Some(path) = arg.strip_prefix("--config=") {
                cli.config = Some(PathBuf::from(path));
            } else if arg.starts_with('-') {
                return Err(RuntimeError::InvalidArgs(format!("unknown flag {}", arg)));
            } else if cli.library.is_none() {
                cli.library = Some(PathBuf::from(arg));
            } else {
                return Err(RuntimeError::InvalidArgs(format!("unexpected argument {}", arg)));
            }
        }

        Ok(cli)
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources
    pub fn load(args: &[String]) -> Result<Self> {
        let cli = CliArgs::parse(args)?;

        let config_file = cli
            .config
            .clone()
            .or_else(|| std::env::var_os("OCGCORE_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            });

        let mut config = match config_file {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                log::info!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli(&cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|source| RuntimeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply environment overrides, reading variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("OCGCORE_LIBRARY").filter(|p| !p.is_empty()) {
            log::info!("Library from env: {}", path);
            self.library.path = Some(PathBuf::from(path));
        }

        if let Some(steps) = lookup("OCGCORE_MAX_STEPS") {
            self.duel.max_steps = steps.trim().parse().map_err(|_| {
                RuntimeError::InvalidConfig(format!("OCGCORE_MAX_STEPS is not a number: {}", steps))
            })?;
        }

        if let Some(flag) = lookup("OCGCORE_LOG_CALLS") {
            self.trace.log_calls = matches!(flag.trim(), "1" | "true" | "yes");
        }

        Ok(())
    }

    /// Apply command line overrides
    pub fn apply_cli(&mut self, cli: &CliArgs) {
        if let Some(path) = &cli.library {
            log::info!("Library from args: {}", path.display());
            self.library.path = Some(path.clone());
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.library.path.as_ref().map_or(true, |p| p.as_os_str().is_empty()) {
            return Err(RuntimeError::InvalidConfig(
                "library path is required (config [library].path, OCGCORE_LIBRARY or first argument)"
                    .into(),
            ));
        }
        if self.duel.seeds.is_empty() {
            return Err(RuntimeError::InvalidConfig("at least one seed is required".into()));
        }
        if self.duel.players.len() > 2 {
            return Err(RuntimeError::InvalidConfig(format!(
                "at most 2 players are supported, got {}",
                self.duel.players.len()
            )));
        }
        if self.duel.max_steps == 0 {
            return Err(RuntimeError::InvalidConfig("max_steps must be positive".into()));
        }
        Ok(())
    }

    /// The validated library path
    pub fn library_path(&self) -> Result<&Path> {
        self.library
            .path
            .as_deref()
            .ok_or_else(|| RuntimeError::InvalidConfig("library path is required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.duel.seeds, vec![0]);
        assert_eq!(config.duel.players.len(), 2);
        assert_eq!(config.duel.players[0].lp, 8000);
        assert!(config.trace.log_calls);
        assert!(config.trace.file.is_none());
        // No library yet
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[library]
path = "/opt/ocg/libocgcore.so"

[duel]
seeds = [12345, 67890, 11111]
max_steps = 32

[[duel.players]]
lp = 4000

[trace]
log_calls = false
file = "calls.jsonl"
"#
        )
        .unwrap();

        let config = RuntimeConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.library_path().unwrap(), Path::new("/opt/ocg/libocgcore.so"));
        assert_eq!(config.duel.seeds, vec![12345, 67890, 11111]);
        assert_eq!(config.duel.max_steps, 32);
        assert_eq!(config.duel.options, 0);
        assert_eq!(
            config.duel.players,
            vec![PlayerConfig {
                lp: 4000,
                start_count: 5,
                draw_count: 1
            }]
        );
        assert!(!config.trace.log_calls);
        assert_eq!(config.trace.file, Some(PathBuf::from("calls.jsonl")));
        assert_eq!(config.config_path.as_deref(), Some(file.path()));
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[duel]\nseeds = \"many\"\n").unwrap();

        let err = RuntimeConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::load_from_file(Path::new("/nonexistent/ocgcore.toml")).unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigRead { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OCGCORE_LIBRARY", "/env/libocgcore.so"),
            ("OCGCORE_MAX_STEPS", "12"),
            ("OCGCORE_LOG_CALLS", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = RuntimeConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.library.path, Some(PathBuf::from("/env/libocgcore.so")));
        assert_eq!(config.duel.max_steps, 12);
        assert!(!config.trace.log_calls);
    }

    #[test]
    fn test_env_rejects_bad_step_count() {
        let mut config = RuntimeConfig::default();
        let err = config
            .apply_env(|key| (key == "OCGCORE_MAX_STEPS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }

    #[test]
    fn test_cli_wins_over_env() {
        let mut config = RuntimeConfig::default();
        config
            .apply_env(|key| (key == "OCGCORE_LIBRARY").then(|| "/env/lib.so".to_string()))
            .unwrap();

        let cli = CliArgs::parse(&args(&["/cli/lib.so"])).unwrap();
        config.apply_cli(&cli);
        assert_eq!(config.library.path, Some(PathBuf::from("/cli/lib.so")));
    }

    #[test]
    fn test_cli_parse() {
        let cli = CliArgs::parse(&args(&["--config", "duel.toml", "lib.so"])).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("duel.toml")));
        assert_eq!(cli.library, Some(PathBuf::from("lib.so")));

        let cli = CliArgs::parse(&args(&["--config=other.toml"])).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        assert_eq!(cli.library, None);

        assert!(CliArgs::parse(&args(&["--config"])).is_err());
        assert!(CliArgs::parse(&args(&["--verbose"])).is_err());
        assert!(CliArgs::parse(&args(&["a.so", "b.so"])).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = RuntimeConfig::default();
        config.library.path = Some(PathBuf::from("lib.so"));
        config.validate().unwrap();

        config.duel.seeds.clear();
        assert!(config.validate().is_err());

        config.duel.seeds = vec![1];
        config.duel.players.push(PlayerConfig::default());
        assert!(config.validate().is_err());

        config.duel.players.truncate(2);
        config.duel.max_steps = 0;
        assert!(config.validate().is_err());
    }
}
