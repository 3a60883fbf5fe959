//! Viewer configuration read from the container element.
//!
//! Defaults come from [`crate::consts`]. A `data-viewer-config` JSON attribute
//! may override any field, and the individual `data-fit-padding`,
//! `data-min-zoom`, `data-max-zoom` and `data-wheel-step` attributes override
//! the JSON in turn.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    ATTR_CONFIG, ATTR_FIT_PADDING, ATTR_MAX_ZOOM, ATTR_MIN_ZOOM, ATTR_WHEEL_STEP, DEFAULT_FIT_PADDING,
    DEFAULT_MAX_BOX_FACTOR, DEFAULT_MIN_BOX_FACTOR, DEFAULT_WHEEL_STEP,
};

/// Error produced while reading viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The `data-viewer-config` attribute is not valid JSON for [`ViewerConfig`].
    #[error("invalid viewer config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// An attribute value did not parse as a number.
    #[error("invalid number for {attr}: {value:?}")]
    InvalidNumber { attr: &'static str, value: String },
    /// A field parsed but lies outside its allowed range.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Tunables for fit padding, zoom bounds and wheel sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Padding fraction used by fit and reset.
    pub fit_padding: f64,
    /// Smallest view width as a multiple of the fitted base box.
    pub min_box_factor: f64,
    /// Largest view width as a multiple of the fitted base box.
    pub max_box_factor: f64,
    /// Zoom ratio per standard wheel notch.
    pub wheel_step: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fit_padding: DEFAULT_FIT_PADDING,
            min_box_factor: DEFAULT_MIN_BOX_FACTOR,
            max_box_factor: DEFAULT_MAX_BOX_FACTOR,
            wheel_step: DEFAULT_WHEEL_STEP,
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON object; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed JSON and
    /// [`ConfigError::OutOfRange`] when a value fails validation.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    /// Build a config from element attributes.
    ///
    /// `lookup` returns the raw value of an attribute, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON attribute or any numeric attribute is
    /// malformed, or if the merged config fails validation.
    pub fn from_attributes<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ATTR_CONFIG) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
            _ => Self::default(),
        };

        if let Some(v) = attr_f64(&lookup, ATTR_FIT_PADDING)? {
            config.fit_padding = v;
        }
        if let Some(v) = attr_f64(&lookup, ATTR_MIN_ZOOM)? {
            config.min_box_factor = v;
        }
        if let Some(v) = attr_f64(&lookup, ATTR_MAX_ZOOM)? {
            config.max_box_factor = v;
        }
        if let Some(v) = attr_f64(&lookup, ATTR_WHEEL_STEP)? {
            config.wheel_step = v;
        }

        config.validate()
    }

    /// Check ranges and normalize swapped zoom bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for a non-finite value, a negative
    /// padding, a non-positive box factor, or a wheel step not above 1.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !self.fit_padding.is_finite() || self.fit_padding < 0.0 {
            return Err(ConfigError::OutOfRange { field: "fit_padding", value: self.fit_padding });
        }
        if !self.min_box_factor.is_finite() || self.min_box_factor <= 0.0 {
            return Err(ConfigError::OutOfRange { field: "min_box_factor", value: self.min_box_factor });
        }
        if !self.max_box_factor.is_finite() || self.max_box_factor <= 0.0 {
            return Err(ConfigError::OutOfRange { field: "max_box_factor", value: self.max_box_factor });
        }
        if !self.wheel_step.is_finite() || self.wheel_step <= 1.0 {
            return Err(ConfigError::OutOfRange { field: "wheel_step", value: self.wheel_step });
        }

        let (min_box_factor, max_box_factor) = if self.min_box_factor <= self.max_box_factor {
            (self.min_box_factor, self.max_box_factor)
        } else {
            (self.max_box_factor, self.min_box_factor)
        };
        Ok(Self { min_box_factor, max_box_factor, ..self })
    }
}

fn attr_f64<F>(lookup: &F, attr: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(attr) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { attr, value: raw.clone() })
}
