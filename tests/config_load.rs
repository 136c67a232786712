use aurora_engine::config::EngineConfigOverrides;
use aurora_engine::easing::Easing;
use aurora_engine::{Engine, EngineConfig, TopicDescriptor};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("engine.json");
    fs::write(&path, body).expect("write config");
    path
}

#[test]
fn loads_a_partial_file_over_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"{
            "viewport": { "width": 1920, "height": 1080 },
            "particles": { "ambient_count": 64, "seed": 12 },
            "camera": { "travel": 4.0 },
            "intro": { "label_count": 10, "falloff_easing": { "curve": "cubic_out" } }
        }"#,
    );
    let config = EngineConfig::load(&path).expect("load config");
    assert_eq!(config.viewport.width, 1920.0);
    assert_eq!(config.particles.ambient_count, 64);
    assert_eq!(config.particles.seed, 12);
    assert_eq!(config.camera.travel, 4.0);
    assert_eq!(config.camera.base_z, 10.0);
    assert_eq!(config.intro.label_count, 10);
    assert_eq!(config.intro.falloff_easing, Easing::CubicOut);
    assert_eq!(config.intro.first_label, 2002);
    assert!(config.validate().is_ok());
}

#[test]
fn missing_file_reports_the_path() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.json");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"), "{err:#}");
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "{ \"particles\": { \"ambient_count\": \"lots\" } }");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"), "{err:#}");
    let config = EngineConfig::load_or_default(&path);
    assert_eq!(config.particles.ambient_count, 150);
}

#[test]
fn validation_names_the_offending_field() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, r#"{ "particles": { "transient_life": [80, 20] } }"#);
    let config = EngineConfig::load(&path).expect("syntactically valid");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("particles.transient_life"), "{err}");
}

#[test]
fn loaded_config_and_overrides_drive_the_engine() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, r#"{ "particles": { "ambient_count": 30 }, "scene": { "lead_in_pages": 0 } }"#);
    let mut config = EngineConfig::load(&path).expect("load config");
    let overrides = EngineConfigOverrides { seed: None, skip_intro: Some(true), ambient_count: Some(12) };
    config.apply_overrides(&overrides);

    let topics = [TopicDescriptor::new("only")];
    let mut engine = Engine::new(config, &topics);
    assert_eq!(engine.intro_phase(), None);
    engine.tick(1.0 / 60.0, None);
    assert_eq!(engine.scene().particles().ambient_count(), 12);
    assert_eq!(engine.scene().progress().page_count(), 1);
}
