use crate::core::map::{FitOptions, MapConfig, TileLayer, Viewport, ViewportSize};
use crate::models::LatLng;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub listings: ListingsSettings,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub prediction: PredictionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Where the listings and prediction APIs live
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_listings_url")]
    pub listings_url: String,
    #[serde(default = "default_prediction_url")]
    pub prediction_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            listings_url: default_listings_url(),
            prediction_url: default_prediction_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_listings_url() -> String { "http://localhost:5000".to_string() }
fn default_prediction_url() -> String { "http://localhost:5000".to_string() }
fn default_timeout_secs() -> u64 { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct ListingsSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingsSettings {
    fn default() -> Self {
        Self { page_size: default_page_size() }
    }
}

fn default_page_size() -> usize { crate::core::query::DEFAULT_PAGE_SIZE }

#[derive(Debug, Clone, Deserialize)]
pub struct MapSettings {
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    #[serde(default = "default_subdomains")]
    pub subdomains: String,
    #[serde(default = "default_max_tile_zoom")]
    pub max_tile_zoom: u8,
    #[serde(default = "default_lat")]
    pub default_lat: f64,
    #[serde(default = "default_lng")]
    pub default_lng: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "default_fit_padding_px")]
    pub fit_padding_px: f64,
    #[serde(default = "default_fit_max_zoom")]
    pub fit_max_zoom: u8,
    #[serde(default = "default_viewport_width_px")]
    pub viewport_width_px: f64,
    #[serde(default = "default_viewport_height_px")]
    pub viewport_height_px: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            subdomains: default_subdomains(),
            max_tile_zoom: default_max_tile_zoom(),
            default_lat: default_lat(),
            default_lng: default_lng(),
            default_zoom: default_zoom(),
            fit_padding_px: default_fit_padding_px(),
            fit_max_zoom: default_fit_max_zoom(),
            viewport_width_px: default_viewport_width_px(),
            viewport_height_px: default_viewport_height_px(),
        }
    }
}

impl MapSettings {
    pub fn viewport_size(&self) -> ViewportSize {
        ViewportSize {
            width: self.viewport_width_px,
            height: self.viewport_height_px,
        }
    }
}

impl From<&MapSettings> for MapConfig {
    fn from(s: &MapSettings) -> Self {
        MapConfig {
            tiles: TileLayer {
                url_template: s.tile_url.clone(),
                attribution: s.attribution.clone(),
                subdomains: s.subdomains.clone(),
                max_zoom: s.max_tile_zoom,
            },
            default_view: Viewport {
                center: LatLng {
                    lat: s.default_lat,
                    lng: s.default_lng,
                },
                zoom: s.default_zoom,
            },
            fit: FitOptions {
                padding_px: s.fit_padding_px,
                max_zoom: s.fit_max_zoom,
            },
        }
    }
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}
fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}
fn default_subdomains() -> String { "abc".to_string() }
fn default_max_tile_zoom() -> u8 { 19 }
fn default_lat() -> f64 { 45.4215 }
fn default_lng() -> f64 { -75.6972 }
fn default_zoom() -> u8 { 11 }
fn default_fit_padding_px() -> f64 { 50.0 }
fn default_fit_max_zoom() -> u8 { 15 }
fn default_viewport_width_px() -> f64 { 1024.0 }
fn default_viewport_height_px() -> f64 { 384.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionSettings {
    /// Half-width of the budget range built around a prediction
    #[serde(default = "default_budget_offset")]
    pub budget_offset: f64,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self { budget_offset: default_budget_offset() }
    }
}

fn default_budget_offset() -> f64 { 200.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Anything other than `pretty` logs in compact form
    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RENTSCOPE_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RENTSCOPE__UPSTREAM__LISTINGS_URL -> upstream.listings_url
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("RENTSCOPE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
