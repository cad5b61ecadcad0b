use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use crate::{Result, TrackerError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub geolocation: GeolocationConfig,
    pub public_ip: PublicIpConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    /// Private address literal -> public address literal used in its place for lookups.
    pub private_overrides: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub pcap_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicIpConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub kml_path: String,
    pub map_path: String,
    pub report_path: String,
    pub map_zoom: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pcap_path: "example-packet-capture/sample_traffic.pcap".to_string(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            database_path: "geolocation-database/GeoLite2-City/GeoLite2-City.mmdb".to_string(),
        }
    }
}

impl Default for PublicIpConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ipinfo.io/json".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            kml_path: "out/map.kml".to_string(),
            map_path: "out/map.html".to_string(),
            report_path: "out/packets.json".to_string(),
            map_zoom: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parses `private_overrides` into address pairs.
    pub fn overrides(&self) -> Result<Vec<(IpAddr, IpAddr)>> {
        self.private_overrides
            .iter()
            .map(|(private, public)| {
                let private: IpAddr = private.trim().parse()
                    .map_err(|_| TrackerError::Parse(format!("Invalid IP: {}", private)))?;
                let public: IpAddr = public.trim().parse()
                    .map_err(|_| TrackerError::Parse(format!("Invalid IP: {}", public)))?;
                Ok((private, public))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.public_ip.endpoint, "https://ipinfo.io/json");
        assert_eq!(config.output.kml_path, "out/map.kml");
        assert_eq!(config.output.map_zoom, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.private_overrides.is_empty());
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let mut config = Config::default();
        config.capture.pcap_path = "captures/home.pcap".to_string();
        config.private_overrides.insert("10.0.0.5".to_string(), "93.184.216.34".to_string());

        let temp_file = NamedTempFile::new().unwrap();
        config.to_file(temp_file.path()).unwrap();

        let loaded = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.capture.pcap_path, "captures/home.pcap");
        assert_eq!(loaded.private_overrides.get("10.0.0.5").map(String::as_str), Some("93.184.216.34"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"output": {"map_zoom": 5}}"#).unwrap();
        assert_eq!(config.output.map_zoom, 5);
        assert_eq!(config.output.kml_path, "out/map.kml");
        assert_eq!(config.geolocation.database_path, GeolocationConfig::default().database_path);
    }

    #[test]
    fn test_override_parsing() {
        let mut config = Config::default();
        config.private_overrides.insert("192.168.1.20".to_string(), "8.8.4.4".to_string());
        let overrides = config.overrides().unwrap();
        assert_eq!(overrides, vec![("192.168.1.20".parse().unwrap(), "8.8.4.4".parse().unwrap())]);

        config.private_overrides.insert("not-an-ip".to_string(), "8.8.4.4".to_string());
        assert!(matches!(config.overrides(), Err(TrackerError::Parse(_))));
    }
}
