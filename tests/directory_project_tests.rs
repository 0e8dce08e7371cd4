/// Integrationstest: Projektverzeichnis mit DirectoryIo und TomlPreferences
use input_layers::{DirectoryIo, DocumentModel, ModelOptions, Preferences, TomlPreferences};
use std::path::Path;

const ROADS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"name":"a"}}
]}"#;

fn open(project: &Path) -> DocumentModel {
    let io = DirectoryIo::open(project).expect("Projektverzeichnis sollte öffnen");
    let preferences = TomlPreferences::load(project.join(".preferences.toml"));
    DocumentModel::load(Box::new(io), Box::new(preferences), ModelOptions::default())
        .expect("Modell sollte laden")
}

#[test]
fn test_startup_loads_documents_and_active_layer() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("Roads.json"), ROADS).expect("Roads schreiben");
    std::fs::write(dir.path().join("Lakes.json"), "").expect("Lakes schreiben");
    let mut preferences = TomlPreferences::load(dir.path().join(".preferences.toml"));
    preferences.set("activeLayer", "Roads").expect("Präferenz setzen");

    let model = open(dir.path());

    let names: Vec<&str> = model.layers().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Lakes", "Roads"]);
    assert_eq!(model.active_layer().map(|l| l.name.as_str()), Some("Roads"));
    assert_eq!(model.features().count(), 1);
}

#[test]
fn test_broken_document_is_skipped_and_left_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("Broken.json"), "{ kaputt").expect("schreiben");
    std::fs::write(dir.path().join("Roads.json"), ROADS).expect("schreiben");

    let model = open(dir.path());

    assert!(model.layer("Broken").is_none());
    assert!(model.layer("Roads").is_some());
    let broken = std::fs::read_to_string(dir.path().join("Broken.json")).expect("lesen");
    assert_eq!(broken, "{ kaputt");
}

#[test]
fn test_changes_survive_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("Roads.json"), ROADS).expect("schreiben");

    {
        let mut model = open(dir.path());
        let roads = model.layer("Roads").expect("Roads").id;
        model.rename_layer(roads, "Streets").expect("rename_layer");
        model.activate_layer(roads).expect("activate_layer");
        let created = model.create_layer().expect("create_layer");
        model.toggle_layer_show(created).expect("hide");
    }

    assert!(dir.path().join("Streets.json").exists());
    assert!(!dir.path().join("Roads.json").exists());
    assert!(dir.path().join("New Layer.json").exists());

    let model = open(dir.path());
    assert_eq!(model.active_layer().map(|l| l.name.as_str()), Some("Streets"));
    assert_eq!(model.layers().count(), 2);
}

#[test]
fn test_layer_names_with_separators_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut model = open(dir.path());

    let result = model.write_layer(input_layers::LayerDocument::new(
        "../outside",
        r#"{"type":"FeatureCollection","features":[]}"#,
    ));

    assert!(result.is_err());
    assert_eq!(model.layers().count(), 0);
    assert!(!dir.path().parent().expect("parent").join("outside.json").exists());
}
