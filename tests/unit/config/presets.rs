use super::*;
use crate::assets::payload::RasterPayload;

fn preset(id: &str) -> WatermarkConfig {
    WatermarkConfig::new(
        id,
        format!("preset {id}"),
        RasterPayload::DataUri("data:image/png;base64,AQID".to_owned()),
    )
}

#[test]
fn upsert_appends_then_replaces_and_activates() {
    let mut lib = PresetLibrary::new();
    assert_eq!(lib.active(), &ActiveWatermark::None);

    lib.upsert(preset("a")).unwrap();
    lib.upsert(preset("b")).unwrap();
    assert_eq!(lib.presets().len(), 2);
    assert_eq!(lib.active().id(), "b");

    let mut edited = preset("a");
    edited.name = "renamed".to_owned();
    lib.upsert(edited).unwrap();
    assert_eq!(lib.presets().len(), 2);
    assert_eq!(lib.get("a").unwrap().name, "renamed");
    assert_eq!(lib.resolve_active().unwrap().id, "a");
}

#[test]
fn upsert_rejects_reserved_and_empty_ids() {
    let mut lib = PresetLibrary::new();
    assert!(lib.upsert(preset(NONE_ID)).is_err());
    assert!(lib.upsert(preset("")).is_err());
    assert!(lib.presets().is_empty());
}

#[test]
fn removing_active_preset_resets_selection() {
    let mut lib = PresetLibrary::new();
    lib.upsert(preset("a")).unwrap();
    lib.upsert(preset("b")).unwrap();

    assert!(lib.remove("a").is_some());
    assert_eq!(lib.active().id(), "b");

    assert!(lib.remove("b").is_some());
    assert_eq!(lib.active(), &ActiveWatermark::None);
    assert!(lib.resolve_active().is_none());
    assert!(lib.remove("missing").is_none());
}

#[test]
fn sentinel_selection_resolves_to_nothing() {
    let mut lib = PresetLibrary::new();
    lib.upsert(preset("a")).unwrap();
    lib.set_active(NONE_ID).unwrap();
    assert!(lib.resolve_active().is_none());
    assert!(lib.set_active("missing").is_err());
}

#[test]
fn json_document_round_trips() {
    let mut lib = PresetLibrary::new();
    lib.upsert(preset("a")).unwrap();
    let json = lib.to_json().unwrap();
    assert!(json.contains("\"activeWatermarkId\": \"a\""));
    assert!(json.contains("\"savedWatermarks\""));

    let back = PresetLibrary::from_json(&json).unwrap();
    assert_eq!(back, lib);

    let none = PresetLibrary::from_json(r#"{"savedWatermarks":[],"activeWatermarkId":"none"}"#)
        .unwrap();
    assert_eq!(none.active(), &ActiveWatermark::None);
    assert!(PresetLibrary::from_json("{").is_err());
}
