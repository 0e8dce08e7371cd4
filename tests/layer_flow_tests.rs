use input_layers::{DocumentModel, LayerId, MemoryIo, MemoryPreferences, ModelOptions, Preferences};

const ROADS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"name":"a"}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"name":"b"}}
]}"#;

const EMPTY: &str = r#"{"type":"FeatureCollection","features":[]}"#;

fn open(documents: &[(&str, &str)]) -> (DocumentModel, MemoryIo, MemoryPreferences) {
    let io = MemoryIo::with_documents(documents.iter().copied());
    let preferences = MemoryPreferences::new();
    let model = DocumentModel::load(
        Box::new(io.clone()),
        Box::new(preferences.clone()),
        ModelOptions::default(),
    )
    .expect("Modell sollte laden");
    (model, io, preferences)
}

fn id_of(model: &DocumentModel, name: &str) -> LayerId {
    model
        .layer(name)
        .unwrap_or_else(|| panic!("Layer '{name}' sollte existieren"))
        .id
}

#[test]
fn test_undo_n_times_restores_initial_state() {
    let (mut model, io, _) = open(&[("Roads", ROADS)]);
    let initial_store = model.store().clone();
    let initial_documents = io.names();
    let roads = id_of(&model, "Roads");

    model.create_layer().expect("create_layer");
    model.duplicate_layer(roads).expect("duplicate_layer");
    model.rename_layer(roads, "Streets").expect("rename_layer");
    let first = model.features().next().expect("Feature").id;
    model.remove_features(&[first]).expect("remove_features");
    model.remove_layer(roads).expect("remove_layer");

    let mut steps = 0;
    while model.undo().expect("undo") {
        steps += 1;
    }

    assert_eq!(steps, 5);
    assert_eq!(*model.store(), initial_store);
    let mut names = io.names();
    names.sort();
    assert_eq!(names, initial_documents);
}

#[test]
fn test_redo_replays_layer_removal_after_undo() {
    let (mut model, io, _) = open(&[("Roads", ROADS)]);
    let roads = id_of(&model, "Roads");

    model.remove_layer(roads).expect("remove_layer");
    model.undo().expect("undo");
    assert!(model.can_redo());

    model.redo().expect("redo");
    assert!(model.layer("Roads").is_none());
    assert!(io.document("Roads").is_none());
    assert!(!model.can_redo());
}

#[test]
fn test_duplicate_layer_names_follow_numbering() {
    let (mut model, _, _) = open(&[("Roads", ROADS), ("Roads (1)", EMPTY), ("Roads (2)", EMPTY)]);

    let copy = model
        .duplicate_layer(id_of(&model, "Roads"))
        .expect("duplicate_layer")
        .expect("Kopie sollte angelegt werden");
    assert_eq!(model.store().layer(copy).expect("Kopie").name, "Roads (3)");

    let copy_of_numbered = model
        .duplicate_layer(id_of(&model, "Roads (1)"))
        .expect("duplicate_layer")
        .expect("Kopie sollte angelegt werden");
    assert_eq!(
        model.store().layer(copy_of_numbered).expect("Kopie").name,
        "Roads (4)"
    );
}

#[test]
fn test_lock_toggle_twice_restores_flags() {
    let (mut model, io, _) = open(&[("Roads", ROADS)]);
    let roads = id_of(&model, "Roads");
    model.activate_layer(roads).expect("activate");

    model.toggle_layer_lock(roads).expect("lock");
    let view = model.layer_properties(roads).expect("Layer");
    assert!(view.locked);
    assert!(!view.active);
    assert!(model.features().all(|f| f.locked));
    assert!(io
        .document("Roads")
        .expect("Dokument")
        .contains(r#""locked":true"#));

    model.toggle_layer_lock(roads).expect("unlock");
    assert!(!model.layer_properties(roads).expect("Layer").locked);
    assert!(model.active_layer().is_none());
    assert!(model.features().all(|f| !f.locked));
    assert!(!io.document("Roads").expect("Dokument").contains("locked"));
}

#[test]
fn test_unreadable_document_is_never_overwritten() {
    let broken = "{kaputt, aber Benutzerdaten";
    let (mut model, io, _) = open(&[("New Layer", broken), ("Roads", ROADS)]);
    assert!(model.layer("New Layer").is_none());

    let created = model.create_layer().expect("create_layer");
    assert_eq!(
        model.layer_properties(created).expect("Layer").name,
        "New Layer (1)"
    );

    let roads = id_of(&model, "Roads");
    model.rename_layer(roads, "New Layer").expect("rename_layer");
    assert_eq!(
        model.layer_properties(roads).expect("Layer").name,
        "New Layer (2)"
    );

    assert_eq!(io.document("New Layer").as_deref(), Some(broken));
}

#[test]
fn test_activation_is_exclusive() {
    let (mut model, _, preferences) = open(&[("Roads", ROADS), ("Lakes", EMPTY)]);
    let roads = id_of(&model, "Roads");
    let lakes = id_of(&model, "Lakes");

    model.activate_layer(roads).expect("activate Roads");
    model.activate_layer(lakes).expect("activate Lakes");

    let active: Vec<LayerId> = model.layers().filter(|l| l.active).map(|l| l.id).collect();
    assert_eq!(active, vec![lakes]);
    assert_eq!(preferences.get("activeLayer").as_deref(), Some("Lakes"));

    model.deactivate_layer(lakes).expect("deactivate");
    assert!(model.active_layer().is_none());
    assert_eq!(preferences.get("activeLayer"), None);
}

#[test]
fn test_hidden_layer_cannot_be_activated() {
    let (mut model, _, _) = open(&[("Roads", ROADS)]);
    let roads = id_of(&model, "Roads");

    model.toggle_layer_show(roads).expect("hide");
    model.activate_layer(roads).expect("activate");

    assert!(model.active_layer().is_none());
}

#[test]
fn test_removing_active_layer_and_undo_restores_activation() {
    let (mut model, _, preferences) = open(&[("Roads", ROADS), ("Lakes", EMPTY)]);
    let roads = id_of(&model, "Roads");
    model.activate_layer(roads).expect("activate");

    model.remove_layer(roads).expect("remove_layer");
    assert!(model.active_layer().is_none());
    assert_eq!(preferences.get("activeLayer"), None);

    model.undo().expect("undo");
    assert_eq!(model.active_layer().map(|l| l.id), Some(roads));
    assert_eq!(preferences.get("activeLayer").as_deref(), Some("Roads"));
}

#[test]
fn test_persistence_failure_propagates() {
    let (mut model, io, _) = open(&[("Roads", ROADS)]);
    io.set_fail_writes(true);

    assert!(model.create_layer().is_err());
    assert!(model.rename_layer(id_of(&model, "Roads"), "Streets").is_err());
    assert_eq!(model.layer("Roads").map(|l| l.name.as_str()), Some("Roads"));
    assert!(!model.can_undo());
}

#[test]
fn test_unknown_ids_are_ignored() {
    let (mut model, _, _) = open(&[("Roads", ROADS)]);
    let ghost = LayerId::generate();

    model.toggle_layer_lock(ghost).expect("lock");
    model.toggle_layer_show(ghost).expect("show");
    model.activate_layer(ghost).expect("activate");
    model.rename_layer(ghost, "Ghost").expect("rename");
    model.remove_layer(ghost).expect("remove");
    model.remove_features(&[]).expect("remove_features");

    assert!(model.layer_properties(ghost).is_none());
    assert!(!model.can_undo());
}
