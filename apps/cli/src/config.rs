use std::fs;
use std::path::{Path, PathBuf};

use ggr_core::CurrencyConfig;
use rates::FixerSettings;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};

const CONFIG_DIR_NAME: &str = "ggr-report";
const CONFIG_FILE_NAME: &str = "config.toml";
const ACCESS_KEY_ENV: &str = "GGR_RATES_ACCESS_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Installs the global subscriber. `RUST_LOG` wins over the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
        match self.format.as_str() {
            "json" => builder.json().init(),
            _ => builder.init(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub rates: FixerSettings,
    /// Social currency table and house-account rules; built-in when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyConfig>,
}

impl CliConfig {
    pub fn currency(&self) -> CurrencyConfig {
        self.currency.clone().unwrap_or_default()
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ACCESS_KEY_ENV)
            && !key.trim().is_empty()
        {
            self.rates.access_key = key;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

/// Reads the config file, writing a default one first when it is missing.
pub fn load_or_create(explicit: Option<&Path>) -> Result<ConfigLoad, String> {
    let file = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_dir()?.join(CONFIG_FILE_NAME),
    };
    let paths = ConfigPaths { file };

    if paths.file.exists() {
        let contents = fs::read_to_string(&paths.file)
            .map_err(|err| format!("read config {}: {}", paths.file.display(), err))?;
        let mut config = parse_config(&contents)
            .map_err(|err| format!("parse config {}: {}", paths.file.display(), err))?;
        config.apply_env();
        return Ok(ConfigLoad {
            config,
            paths,
            created: false,
        });
    }

    if let Some(dir) = paths.file.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    }
    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&paths.file, contents)
        .map_err(|err| format!("write config {}: {}", paths.file.display(), err))?;

    let mut config = config;
    config.apply_env();
    Ok(ConfigLoad {
        config,
        paths,
        created: true,
    })
}

fn parse_config(contents: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(contents)
}

fn config_dir() -> Result<PathBuf, String> {
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}
