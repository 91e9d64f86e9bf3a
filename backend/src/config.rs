use serde::{Deserialize, Serialize};
use tokio::{fs, sync::OnceCell};

use crate::server::InitError;

pub static CONFIG: OnceCell<GlobalConfig> = OnceCell::const_new();

const CONFIG_PATH: &str = "config/config.toml";

#[derive(Serialize, Deserialize, Debug)]
pub struct GlobalConfig {
    /// 0 is trace, 4 is error, anything else is info
    #[serde(default = "default_log_level")]
    pub log_level: usize,
    #[serde(default)]
    pub database: Database,
}

fn default_log_level() -> usize {
    2
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Database {
    pub path: String,
    /// run pending migrations on startup (standalone builds only)
    #[serde(default)]
    pub migrate: Option<bool>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            path: "database/backend.sqlite".to_owned(),
            migrate: Some(true),
        }
    }
}

/// Load `config/config.toml` into [`CONFIG`], writing a default file
/// when none exists.
pub async fn init() -> Result<(), InitError> {
    if CONFIG.get().is_some() {
        return Ok(());
    }
    let config = match fs::read_to_string(CONFIG_PATH).await {
        Ok(raw) => toml::from_str(&raw).map_err(InitError::ConfigParse)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = CONFIG_PATH, "config_missing");
            let config: GlobalConfig = toml::from_str("").unwrap();
            if let Some(parent) = std::path::Path::new(CONFIG_PATH).parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(InitError::ConfigDir)?;
            }
            fs::write(CONFIG_PATH, toml::to_string(&config).unwrap())
                .await
                .map_err(InitError::ConfigWrite)?;
            config
        }
        Err(err) => return Err(InitError::ConfigRead(err)),
    };
    CONFIG.set(config).ok();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::GlobalConfig;

    #[test]
    fn default() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level, 2);
        assert_eq!(config.database.path, "database/backend.sqlite");
    }

    #[test]
    fn partial_override() {
        let config: GlobalConfig = toml::from_str(
            r#"
log_level = 0

[database]
path = "/tmp/test.sqlite"
"#,
        )
        .unwrap();
        assert_eq!(config.log_level, 0);
        assert_eq!(config.database.path, "/tmp/test.sqlite");
        assert_eq!(config.database.migrate, None);
    }
}
