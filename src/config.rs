//! Scanner configuration.
//!
//! [`ScanConfig`] carries every tunable of the pipeline. Defaults suit
//! handheld camera frames; [`ScanConfig::from_env`] overlays `DM_*`
//! environment variables so a deployed binary can be tuned without a
//! rebuild.

use std::str::FromStr;

use crate::error::ConfigError;

/// Which polarities the resolver may plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolarityMode {
    /// Decide per frame from the background level and the session hint
    #[default]
    AutoDetect,
    /// Only look for dark marks on a light background
    ForceDarkOnLight,
    /// Only look for light marks on a dark background
    ForceLightOnDark,
}

impl FromStr for PolarityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "autodetect" | "auto-detect" => Ok(PolarityMode::AutoDetect),
            "dark" | "dark-on-light" | "darkonlight" => Ok(PolarityMode::ForceDarkOnLight),
            "light" | "light-on-dark" | "lightondark" => Ok(PolarityMode::ForceLightOnDark),
            other => Err(ConfigError::InvalidPolarityMode(other.to_string())),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Polarity policy (default: auto-detect)
    pub polarity_mode: PolarityMode,
    /// Minimum locator confidence a candidate needs to be sampled (default: 0.5)
    pub min_confidence_threshold: f32,
    /// Weight kept by the polarity hint on each success (default: 0.7)
    pub hint_decay_factor: f32,
    /// Border mean at or below which light-on-dark is tried first (default: 85)
    pub dark_background_threshold: u8,
    /// Border mean at or above which dark-on-light is tried first (default: 170)
    pub light_background_threshold: u8,
    /// Ink margin over the local mean for a pixel to count as ink (default: 8)
    pub threshold_constant: u8,
    /// Smallest connected component considered as a symbol (default: 40 px)
    pub min_component_pixels: usize,
    /// Minimum finder/alignment pattern agreement of a sampled grid (default: 0.85)
    pub min_finder_match: f32,
    /// Minimum share of cells sampled with a clear majority (default: 0.7)
    pub min_confident_fraction: f32,
    /// Run both polarity passes concurrently when the background is ambiguous (default: true)
    pub parallel_passes: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            polarity_mode: PolarityMode::AutoDetect,
            min_confidence_threshold: 0.5,
            hint_decay_factor: 0.7,
            dark_background_threshold: 85,
            light_background_threshold: 170,
            threshold_constant: 8,
            min_component_pixels: 40,
            min_finder_match: 0.85,
            min_confident_fraction: 0.7,
            parallel_passes: true,
        }
    }
}

impl ScanConfig {
    /// Defaults overlaid with `DM_POLARITY_MODE`, `DM_MIN_CONFIDENCE`,
    /// `DM_HINT_DECAY` and `DM_PARALLEL_PASSES`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(mode) = std::env::var("DM_POLARITY_MODE") {
            config.polarity_mode = mode.parse()?;
        }
        config.min_confidence_threshold =
            parse_env_f32("DM_MIN_CONFIDENCE", config.min_confidence_threshold);
        config.hint_decay_factor = parse_env_f32("DM_HINT_DECAY", config.hint_decay_factor);
        config.parallel_passes = parse_env_bool("DM_PARALLEL_PASSES", config.parallel_passes);
        config.validate()?;
        Ok(config)
    }

    /// Set the polarity policy
    pub fn with_polarity_mode(mut self, mode: PolarityMode) -> Self {
        self.polarity_mode = mode;
        self
    }

    /// Set the minimum locator confidence
    pub fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence_threshold = threshold;
        self
    }

    /// Set the polarity hint smoothing
    pub fn with_hint_decay(mut self, decay: f32) -> Self {
        self.hint_decay_factor = decay;
        self
    }

    /// Enable or disable concurrent polarity passes
    pub fn with_parallel_passes(mut self, parallel: bool) -> Self {
        self.parallel_passes = parallel;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("min_confidence_threshold", self.min_confidence_threshold)?;
        check_unit("min_finder_match", self.min_finder_match)?;
        check_unit("min_confident_fraction", self.min_confident_fraction)?;
        if !(0.0..1.0).contains(&self.hint_decay_factor) {
            return Err(ConfigError::OutOfRange {
                field: "hint_decay_factor",
                value: self.hint_decay_factor,
            });
        }
        if self.dark_background_threshold >= self.light_background_threshold {
            return Err(ConfigError::OutOfRange {
                field: "dark_background_threshold",
                value: self.dark_background_threshold as f32,
            });
        }
        Ok(())
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn parse_env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
