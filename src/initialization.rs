use std::env;
use std::fmt;
use std::fmt::Formatter;
use std::fs;
use serde::Deserialize;
use crate::registry::RegistryConfig;

const CONFIG_ENV: &str = "PV_HUB_CONFIG";
const CONFIG_DEFAULT: &str = "pv_hub.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct WebServer {
    pub bind_address: String,
    pub bind_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Files {
    pub cache_dir: String,
    pub static_dir: String,
}

/// Tunables for the simulated production pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct Production {
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default = "default_fault_probability")]
    pub fault_probability: f64,
    #[serde(default = "default_subunit_count")]
    pub subunit_count: usize,
}

fn default_efficiency() -> f64 { 0.20 }
fn default_fault_probability() -> f64 { 0.05 }
fn default_subunit_count() -> usize { 6 }

/// Annotation sheet backend selection, 'local' or 'remote'
#[derive(Debug, Clone, Deserialize)]
pub struct Annotations {
    pub backend: String,
    #[serde(default)]
    pub sheet_path: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub web_server: WebServer,
    pub files: Files,
    pub production: Production,
    pub annotations: Annotations,
    pub registry: RegistryConfig,
}

/// Loads the configuration from the file named by the PV_HUB_CONFIG
/// environment variable, falling back to pv_hub.toml in the working directory
pub fn config() -> Result<Config, ConfigError> {
    let path = env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_DEFAULT.to_string());
    let contents = fs::read_to_string(&path)
        .map_err(|e| ConfigError(format!("{}: {}", path, e)))?;
    let config: Config = toml::from_str(&contents)?;

    Ok(config)
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config_with_defaults() {
        let toml_text = r#"
            [web_server]
            bind_address = "127.0.0.1"
            bind_port = 8080

            [files]
            cache_dir = "./cache/"
            static_dir = "./static"

            [production]

            [annotations]
            backend = "local"
            sheet_path = "./relatorios/motivos.csv"

            [[registry.plants]]
            id = "Usina 1"
            lat = -23.5505
            lon = -46.6333
            timezone = "America/Sao_Paulo"

            [[registry.inverters]]
            id = "331"
            lat = -23.5505
            lon = -46.6333
            timezone = "America/Sao_Paulo"
            parent_id = "Usina 1"
        "#;

        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.web_server.bind_port, 8080);
        assert_eq!(config.production.efficiency, 0.20);
        assert_eq!(config.production.fault_probability, 0.05);
        assert_eq!(config.production.subunit_count, 6);
        assert_eq!(config.registry.plants.len(), 1);
        assert_eq!(config.registry.inverters[0].parent_id.as_deref(), Some("Usina 1"));
        assert!(config.annotations.endpoint.is_none());
    }
}
