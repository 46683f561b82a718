use serde::Deserialize;
use std::path::PathBuf;

use crate::geofence::Polygon;

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    /// Base URL of the report backend.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Campus boundary as [lat, lon] pairs. Defaults to the compiled-in
    /// campus polygon when absent.
    #[serde(default)]
    pub boundary: Option<Vec<(f64, f64)>>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub moderation: Option<ModerationConfig>,
    #[serde(default)]
    pub geocoder: Option<GeocoderConfig>,
}

fn default_moderation_endpoints() -> Vec<String> {
    vec![
        "https://generativelanguage.googleapis.com/v1/models/gemini-2.0-flash:generateContent"
            .to_string(),
        "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent"
            .to_string(),
    ]
}

fn default_moderation_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModerationConfig {
    /// Model endpoints tried in order; the first that answers wins.
    #[serde(default = "default_moderation_endpoints")]
    pub endpoints: Vec<String>,
    /// API key. Falls back to the GEMINI_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_moderation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            endpoints: default_moderation_endpoints(),
            api_key: None,
            timeout_secs: default_moderation_timeout_secs(),
        }
    }
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_geocoder_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub url: String,
    #[serde(default = "default_geocoder_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            timeout_secs: default_geocoder_timeout_secs(),
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    pub fn api_url(&self) -> String {
        self.api_url.clone().unwrap_or_else(default_api_url)
    }

    /// The geofence boundary to validate submissions against.
    pub fn boundary(&self) -> Polygon {
        match &self.boundary {
            Some(pairs) => Polygon::from_pairs(pairs),
            None => Polygon::campus_default(),
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("campusreport.toml"));
    paths.push(PathBuf::from(".campusreport.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("campusreport").join("config.toml"));
        paths.push(config_dir.join("campusreport.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".campusreport.toml"));
        paths.push(home.join(".config").join("campusreport").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::GeoPoint;

    #[test]
    fn test_defaults_when_empty() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.api_url(), "http://localhost:5000");
        assert!(!config.verbose);
        // Default boundary is the campus polygon.
        assert!(config.boundary().contains(GeoPoint::new(19.0213, 72.8707)));
    }

    #[test]
    fn test_custom_boundary() {
        let config: FileConfig = toml::from_str(
            r#"
            api_url = "https://reports.example.edu"
            boundary = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url(), "https://reports.example.edu");
        let boundary = config.boundary();
        assert!(boundary.contains(GeoPoint::new(0.5, 0.5)));
        assert!(!boundary.contains(GeoPoint::new(19.0213, 72.8707)));
    }

    #[test]
    fn test_moderation_defaults() {
        let config: FileConfig = toml::from_str("[moderation]\n").unwrap();
        let moderation = config.moderation.unwrap();
        assert_eq!(moderation.endpoints.len(), 2);
        assert!(moderation.endpoints[0].contains("gemini-2.0-flash"));
        assert!(moderation.endpoints[1].contains("gemini-1.5-flash"));
        assert_eq!(moderation.timeout_secs, 60);
    }
}
