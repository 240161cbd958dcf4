use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Billing calendar used when neither --solar nor --lunar is given.
    #[serde(default = "default_lunar_mode")]
    pub lunar_mode: bool,
    #[serde(default = "default_currency_suffix")]
    pub currency_suffix: String,
    /// Where `send-backup` delivers the snapshot.
    #[serde(default)]
    pub backup_destination: Option<String>,
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,
    /// Send one backup per day automatically after a change.
    #[serde(default)]
    pub auto_backup: bool,
}

fn default_lunar_mode() -> bool {
    true
}
fn default_currency_suffix() -> String {
    "元".to_string()
}
fn default_outbox_dir() -> String {
    Config::config_dir()
        .join("outbox")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            lunar_mode: default_lunar_mode(),
            currency_suffix: default_currency_suffix(),
            backup_destination: None,
            outbox_dir: default_outbox_dir(),
            auto_backup: false,
        }
    }

    /// Return the standard configuration directory (`~/.rshiftbook`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rshiftbook")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rshiftbook.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rshiftbook.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files.
    ///
    /// Returns the configuration that was (or, in test mode, would have
    /// been) written.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Self::with_database(db_path.clone());

        // Write config file
        if !is_test {
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            if let Some(parent) = db_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::File::create(&db_path).map_err(|e| {
                io::Error::new(e.kind(), format!("{}: {}", db_path.display(), e))
            })?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_files_get_defaults_for_new_fields() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\n").unwrap();
        assert!(cfg.lunar_mode);
        assert_eq!(cfg.currency_suffix, "元");
        assert!(!cfg.auto_backup);
        assert_eq!(cfg.backup_destination, None);
    }

    #[test]
    fn yaml_round_trip() {
        let mut cfg = Config::default();
        cfg.backup_destination = Some("boss@example.com".into());
        cfg.auto_backup = true;

        let back: Config = serde_yaml::from_str(&cfg.to_yaml().unwrap()).unwrap();
        assert_eq!(back.backup_destination.as_deref(), Some("boss@example.com"));
        assert!(back.auto_backup);
    }
}
