use std::fs;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::types::ProviderSet;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Ordered provider names. Order fixes series index assignment and
    /// must not change between writes and reads of the same store.
    pub providers: Option<Vec<String>>,
    /// Default currency code when no user preference is stored.
    pub currency: Option<String>,
    /// Settings webhook notified when the currency preference changes.
    pub webhook_url: Option<String>,
}

pub fn load_config() -> Config {
    let Some(dirs) = ProjectDirs::from("", "", "faretab") else {
        return Config::default();
    };

    let path = dirs.config_dir().join("config.toml");
    let Ok(data) = fs::read_to_string(&path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: invalid config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

impl Config {
    pub fn provider_set(&self) -> ProviderSet {
        match &self.providers {
            Some(names) if !names.is_empty() => ProviderSet::new(names.clone()),
            _ => ProviderSet::default(),
        }
    }

    pub fn default_currency(&self) -> String {
        self.currency.clone().unwrap_or_else(|| "GBP".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::default();
        let providers = config.provider_set();
        assert_eq!(providers.names(), ["uber", "hailo", "addisonlee"]);
        assert_eq!(config.default_currency(), "GBP");
    }

    #[test]
    fn configured_providers_keep_their_order() {
        let config: Config = toml::from_str(
            r#"
            providers = ["gett", "uber"]
            currency = "EUR"
            "#,
        )
        .unwrap();

        let providers = config.provider_set();
        assert_eq!(providers.index_of("gett"), Some(0));
        assert_eq!(providers.index_of("uber"), Some(1));
        assert_eq!(config.default_currency(), "EUR");
    }
}
