//! Export configuration file: the role→column mapping, the export opacity,
//! the four editable legends, and the optional "extra column" selections for
//! the popup texts. Stored as JSON so legends can be hand-edited between a
//! `refresh` and an `export`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::legend::LegendSet;
use crate::mapping::ColumnMapping;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    OpacityOutOfRange(u8),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read or write configuration: {e}"),
            ConfigError::Json(e) => write!(f, "Invalid configuration JSON: {e}"),
            ConfigError::OpacityOutOfRange(v) => {
                write!(f, "opacity_pct must be between 0 and 100, got {v}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub columns: ColumnMapping,
    /// Fill opacity for sector polygons, 0–100. Site markers ignore it.
    #[serde(default = "default_opacity")]
    pub opacity_pct: u8,
    /// Columns surfaced in site popups. Absent = all columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_info_columns: Option<Vec<String>>,
    /// Columns surfaced in sector popups. Absent = all columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_info_columns: Option<Vec<String>>,
    #[serde(default)]
    pub legends: LegendSet,
}

fn default_opacity() -> u8 {
    50
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            columns: ColumnMapping::default(),
            opacity_pct: default_opacity(),
            site_info_columns: None,
            sector_info_columns: None,
            legends: LegendSet::default(),
        }
    }
}

impl ExportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&raw)?;
        config.check()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let mut rendered = serde_json::to_string_pretty(self)?;
        rendered.push('\n');
        fs::write(path, rendered)?;
        Ok(())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.opacity_pct > 100 {
            return Err(ConfigError::OpacityOutOfRange(self.opacity_pct));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut config = ExportConfig::default();
        config.columns.site_name = Some("Site".into());
        config.opacity_pct = 70;
        config.legends.radius_value.insert("Macro".into(), "200".into());

        let json = serde_json::to_string(&config).unwrap();
        let back: ExportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.columns.site_name.as_deref(), Some("Site"));
        assert_eq!(back.opacity_pct, 70);
        assert_eq!(back.legends.radius_value["Macro"], "200");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{"columns": {}}"#).unwrap();
        assert_eq!(config.opacity_pct, 50);
        assert!(config.site_info_columns.is_none());
        assert!(config.legends.beam_value.is_empty());
    }

    #[test]
    fn out_of_range_opacity_is_rejected() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"columns": {}, "opacity_pct": 150}"#).unwrap();
        assert!(matches!(
            config.check(),
            Err(ConfigError::OpacityOutOfRange(150))
        ));
    }
}
