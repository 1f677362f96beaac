//! Post-Effect Settings & Quality Tiers
//!
//! This module defines the user-facing configuration of the compositor.
//!
//! [`Quality`] is the shared four-tier knob used by SSAO, SSR and depth of
//! field. Each effect maps a tier to its own sample counts:
//!
//! | Tier     | SSAO kernel | SSR max iteration | SSR pixel stride | DOF kernel |
//! |----------|-------------|-------------------|------------------|------------|
//! | `low`    | 6           | 10                | 32               | 4          |
//! | `medium` | 12          | 20                | 16               | 8          |
//! | `high`   | 32          | 40                | 8                | 16         |
//! | `ultra`  | 62          | 80                | 4                | 32         |
//!
//! Unknown tier names fall back to `medium` with a warning.
//!
//! [`PostEffectSettings`] is the serde form of a whole post-effect
//! configuration, applied in one go through
//! [`EffectCompositor::apply_settings`](crate::renderer::compositor::EffectCompositor::apply_settings).
//!
//! ```json
//! {
//!   "enable": true,
//!   "bloom": { "enable": true, "intensity": 0.1 },
//!   "depthOfField": { "enable": true, "focalDistance": 5.0, "quality": "high" },
//!   "screenSpaceAmbientOcclusion": { "enable": true, "radius": 1.5, "quality": "ultra" },
//!   "screenSpaceReflection": { "enable": false },
//!   "colorCorrection": { "enable": true, "exposure": 0.5 },
//!   "edge": { "enable": false },
//!   "FXAA": { "enable": true }
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{ClayError, Result};
use crate::renderer::backend::TextureHandle;

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Four-tier quality knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Ultra];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }

    /// Parses a tier name, falling back to [`Quality::Medium`] with a warning.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown quality `{name}`, using `{}`", Self::default().name());
            Self::default()
        })
    }

    /// Number of SSAO hemisphere samples.
    #[must_use]
    pub const fn ssao_kernel_size(self) -> u32 {
        match self {
            Self::Low => 6,
            Self::Medium => 12,
            Self::High => 32,
            Self::Ultra => 62,
        }
    }

    #[must_use]
    pub const fn ssr_max_iteration(self) -> u32 {
        match self {
            Self::Low => 10,
            Self::Medium => 20,
            Self::High => 40,
            Self::Ultra => 80,
        }
    }

    #[must_use]
    pub const fn ssr_pixel_stride(self) -> u32 {
        match self {
            Self::Low => 32,
            Self::Medium => 16,
            Self::High => 8,
            Self::Ultra => 4,
        }
    }

    /// Number of Poisson samples per DOF blur tap.
    #[must_use]
    pub const fn dof_kernel_size(self) -> usize {
        match self {
            Self::Low => 4,
            Self::Medium => 8,
            Self::High => 16,
            Self::Ultra => 32,
        }
    }
}

impl FromStr for Quality {
    type Err = ClayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|quality| quality.name() == s)
            .ok_or_else(|| ClayError::UnknownQuality(s.to_owned()))
    }
}

impl From<String> for Quality {
    fn from(name: String) -> Self {
        Self::from_name_or_default(&name)
    }
}

impl From<Quality> for String {
    fn from(quality: Quality) -> Self {
        quality.name().to_owned()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// EffectValue
// ---------------------------------------------------------------------------

/// Value passed to the name-dispatched parameter setters.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectValue {
    Number(f32),
    /// Tier names and other symbolic values.
    Text(String),
    Color(Vec3),
}

impl EffectValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<Vec3> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<f32> for EffectValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EffectValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for EffectValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Quality> for EffectValue {
    fn from(value: Quality) -> Self {
        Self::Text(value.name().to_owned())
    }
}

impl From<Vec3> for EffectValue {
    fn from(value: Vec3) -> Self {
        Self::Color(value)
    }
}

// ---------------------------------------------------------------------------
// PostEffectSettings
// ---------------------------------------------------------------------------

/// Bloom configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BloomSettings {
    pub enable: bool,
    pub intensity: Option<f32>,
}

/// Depth of field configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepthOfFieldSettings {
    pub enable: bool,
    pub focal_distance: Option<f32>,
    pub focal_range: Option<f32>,
    pub fstop: Option<f32>,
    pub blur_radius: Option<f32>,
    pub quality: Option<Quality>,
}

/// Screen space ambient occlusion configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsaoSettings {
    pub enable: bool,
    pub radius: Option<f32>,
    pub intensity: Option<f32>,
    pub quality: Option<Quality>,
}

/// Screen space reflection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsrSettings {
    pub enable: bool,
    pub quality: Option<Quality>,
    pub max_roughness: Option<f32>,
}

/// Tone mapping exposure and color grading.
///
/// `exposure` is in stops; the composite pass receives `2^exposure`.
/// Exposure applies regardless of `enable`, which only gates the grading
/// (brightness, contrast, saturation and the lookup texture).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorCorrectionSettings {
    pub enable: bool,
    pub exposure: Option<f32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    #[serde(skip)]
    pub lookup_texture: Option<TextureHandle>,
}

/// Edge detection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeSettings {
    pub enable: bool,
    pub color: Option<[f32; 3]>,
}

/// Anti-aliasing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FxaaSettings {
    pub enable: bool,
}

/// Complete post-effect configuration.
///
/// Every field is defaulted, so a partial JSON document is valid. A missing
/// sub-object disables that effect; a missing numeric field leaves the
/// current value untouched. `enable = false` turns every effect off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostEffectSettings {
    pub enable: bool,
    pub bloom: BloomSettings,
    pub depth_of_field: DepthOfFieldSettings,
    pub screen_space_ambient_occlusion: SsaoSettings,
    pub screen_space_reflection: SsrSettings,
    pub color_correction: ColorCorrectionSettings,
    pub edge: EdgeSettings,
    #[serde(rename = "FXAA")]
    pub fxaa: FxaaSettings,
}

impl Default for PostEffectSettings {
    fn default() -> Self {
        Self {
            enable: true,
            bloom: BloomSettings::default(),
            depth_of_field: DepthOfFieldSettings::default(),
            screen_space_ambient_occlusion: SsaoSettings::default(),
            screen_space_reflection: SsrSettings::default(),
            color_correction: ColorCorrectionSettings::default(),
            edge: EdgeSettings::default(),
            fxaa: FxaaSettings::default(),
        }
    }
}

impl PostEffectSettings {
    /// Parses settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_rejects_unknown_tiers() {
        assert_eq!("ultra".parse::<Quality>().unwrap(), Quality::Ultra);
        assert!(matches!(
            "extreme".parse::<Quality>(),
            Err(ClayError::UnknownQuality(name)) if name == "extreme"
        ));
        assert_eq!(Quality::from_name_or_default("extreme"), Quality::Medium);
    }

    #[test]
    fn quality_serializes_as_name() {
        let json = serde_json::to_string(&Quality::High).unwrap();
        assert_eq!(json, "\"high\"");
        let fallback: Quality = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(fallback, Quality::Medium);
    }

    #[test]
    fn partial_settings_use_defaults() {
        let settings = PostEffectSettings::from_json(
            r#"{ "depthOfField": { "enable": true, "quality": "low" }, "FXAA": { "enable": true } }"#,
        )
        .unwrap();
        assert!(settings.enable);
        assert!(settings.depth_of_field.enable);
        assert_eq!(settings.depth_of_field.quality, Some(Quality::Low));
        assert_eq!(settings.depth_of_field.focal_distance, None);
        assert!(settings.fxaa.enable);
        assert!(!settings.bloom.enable);
    }
}
