//! Settings tests
//!
//! Tests for:
//! - Quality tier tables of SSAO, SSR and depth of field
//! - Tier name parsing and fallback
//! - PostEffectSettings JSON shape
//! - Accumulation frame counter

use clay::renderer::accumulation::DEFAULT_ACCUMULATION_FRAMES;
use clay::renderer::settings::{EffectValue, PostEffectSettings, Quality};
use clay::Accumulator;
use glam::Vec3;

// ============================================================================
// Quality
// ============================================================================

#[test]
fn quality_tables() {
    let table: Vec<_> = Quality::ALL
        .into_iter()
        .map(|q| {
            (
                q.name(),
                q.ssao_kernel_size(),
                q.ssr_max_iteration(),
                q.ssr_pixel_stride(),
                q.dof_kernel_size(),
            )
        })
        .collect();
    assert_eq!(
        table,
        [
            ("low", 6, 10, 32, 4),
            ("medium", 12, 20, 16, 8),
            ("high", 32, 40, 8, 16),
            ("ultra", 62, 80, 4, 32),
        ]
    );
}

#[test]
fn quality_names_round_trip_through_display() -> anyhow::Result<()> {
    for quality in Quality::ALL {
        assert_eq!(quality.to_string().parse::<Quality>()?, quality);
    }
    assert!("Ultra".parse::<Quality>().is_err());
    assert_eq!(Quality::from_name_or_default(""), Quality::Medium);
    Ok(())
}

#[test]
fn effect_values_convert() {
    assert_eq!(EffectValue::from(1.5_f32).as_number(), Some(1.5));
    assert_eq!(EffectValue::from("high").as_text(), Some("high"));
    assert_eq!(EffectValue::from(Quality::Low).as_text(), Some("low"));
    assert_eq!(EffectValue::from(Vec3::ONE).as_color(), Some(Vec3::ONE));
    assert_eq!(EffectValue::from("high").as_number(), None);
}

// ============================================================================
// PostEffectSettings
// ============================================================================

#[test]
fn full_settings_document_parses() -> anyhow::Result<()> {
    let settings = PostEffectSettings::from_json(
        r#"{
            "enable": true,
            "bloom": { "enable": true, "intensity": 0.1 },
            "depthOfField": {
                "enable": true,
                "focalDistance": 5.0,
                "focalRange": 2.0,
                "fstop": 2.8,
                "blurRadius": 10.0,
                "quality": "high"
            },
            "screenSpaceAmbientOcclusion": { "enable": true, "radius": 1.5, "intensity": 1.2, "quality": "ultra" },
            "screenSpaceReflection": { "enable": true, "quality": "low", "maxRoughness": 0.6 },
            "colorCorrection": { "enable": true, "exposure": 0.5, "brightness": 0.1, "contrast": 1.2, "saturation": 0.9 },
            "edge": { "enable": true, "color": [0.1, 0.2, 0.3] },
            "FXAA": { "enable": true }
        }"#,
    )?;

    assert_eq!(settings.bloom.intensity, Some(0.1));
    assert_eq!(settings.depth_of_field.quality, Some(Quality::High));
    assert_eq!(settings.depth_of_field.blur_radius, Some(10.0));
    assert_eq!(settings.screen_space_ambient_occlusion.quality, Some(Quality::Ultra));
    assert_eq!(settings.screen_space_reflection.max_roughness, Some(0.6));
    assert_eq!(settings.color_correction.saturation, Some(0.9));
    assert_eq!(settings.color_correction.lookup_texture, None);
    assert_eq!(settings.edge.color, Some([0.1, 0.2, 0.3]));
    assert!(settings.fxaa.enable);
    Ok(())
}

#[test]
fn empty_document_is_enabled_with_every_effect_off() -> anyhow::Result<()> {
    let settings = PostEffectSettings::from_json("{}")?;
    assert_eq!(settings, PostEffectSettings::default());
    assert!(settings.enable);
    assert!(!settings.fxaa.enable);
    assert!(!settings.screen_space_reflection.enable);
    Ok(())
}

#[test]
fn settings_serialize_with_camel_case_keys() -> anyhow::Result<()> {
    let json = serde_json::to_value(PostEffectSettings::default())?;
    for key in [
        "enable",
        "bloom",
        "depthOfField",
        "screenSpaceAmbientOcclusion",
        "screenSpaceReflection",
        "colorCorrection",
        "edge",
        "FXAA",
    ] {
        assert!(json.get(key).is_some(), "missing `{key}`");
    }
    assert!(json["colorCorrection"].get("lookupTexture").is_none());
    Ok(())
}

// ============================================================================
// Accumulation
// ============================================================================

#[test]
fn accumulator_restarts_after_scene_change() {
    let mut acc = Accumulator::default();
    assert_eq!(acc.max_frames(), DEFAULT_ACCUMULATION_FRAMES);

    let frames: Vec<u64> = std::iter::from_fn(|| acc.next_frame()).collect();
    assert_eq!(frames.len() as u64, DEFAULT_ACCUMULATION_FRAMES);
    assert_eq!(frames.first(), Some(&0));
    assert!(acc.is_finished());
    assert_eq!(acc.next_frame(), None);

    acc.restart();
    assert_eq!(acc.frame(), 0);
    assert_eq!(acc.next_frame(), Some(0));
}
