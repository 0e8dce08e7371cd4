//! Input-Layers CLI.
//!
//! Öffnet ein Projektverzeichnis (ein `<name>.json` pro Layer) und führt
//! genau eine Layer-Operation aus.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use input_layers::{DirectoryIo, DocumentModel, LayerDocument, LayerId, ModelOptions, TomlPreferences};
use std::path::{Path, PathBuf};

/// Name der Präferenz-Datei im Projektverzeichnis.
const PREFERENCES_FILE: &str = ".preferences.toml";

#[derive(Parser, Debug)]
#[command(name = "input-layers", version, about = "Input-Layer eines Kartenprojekts verwalten")]
struct Cli {
    /// Projektverzeichnis
    #[arg(short = 'p', long = "project", value_name = "DIR", default_value = ".")]
    project: PathBuf,

    /// Optionen-Datei (Standard: input_layers.toml neben der Binary)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: LayerCommandArg,
}

#[derive(Subcommand, Debug)]
enum LayerCommandArg {
    /// Alle Layer mit Zustand auflisten
    List,
    /// Leeren Layer anlegen
    Create,
    /// GeoJSON-Datei als neuen Layer importieren
    Import { file: PathBuf },
    /// Layer kopieren
    Duplicate { name: String },
    /// Layer umbenennen
    Rename { name: String, new_name: String },
    /// Layer entfernen
    Remove { name: String },
    /// Layer sperren bzw. entsperren
    Lock { name: String },
    /// Layer verstecken bzw. zeigen
    Show { name: String },
    /// Layer aktivieren
    Activate { name: String },
    /// Aktiven Layer zurücksetzen
    Deactivate,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    log::debug!("input-layers v{} startet...", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.clone().unwrap_or_else(ModelOptions::config_path);
    let options = ModelOptions::load_from_file(&config_path);

    let io = DirectoryIo::open(&cli.project)?;
    log::info!("Projekt: {}", io.root().display());
    let preferences = TomlPreferences::load(cli.project.join(PREFERENCES_FILE));
    log::debug!("Präferenzen: {}", preferences.path().display());
    let mut model = DocumentModel::load(Box::new(io), Box::new(preferences), options)?;

    model.register(|event| log::debug!("Event: {}", event.kind()));
    run(&mut model, cli.command)?;
    model.dispatch_pending();
    Ok(())
}

fn run(model: &mut DocumentModel, command: LayerCommandArg) -> Result<()> {
    match command {
        LayerCommandArg::List => list(model),
        LayerCommandArg::Create => {
            let layer_id = model.create_layer()?;
            println!("{}", layer_name(model, layer_id));
        }
        LayerCommandArg::Import { file } => {
            let document = read_document(&file)?;
            let layer_id = model.write_layer(document)?;
            println!("{}", layer_name(model, layer_id));
        }
        LayerCommandArg::Duplicate { name } => {
            let source = find_layer(model, &name)?;
            if let Some(layer_id) = model.duplicate_layer(source)? {
                println!("{}", layer_name(model, layer_id));
            }
        }
        LayerCommandArg::Rename { name, new_name } => {
            let layer_id = find_layer(model, &name)?;
            model.rename_layer(layer_id, &new_name)?;
            println!("{}", layer_name(model, layer_id));
        }
        LayerCommandArg::Remove { name } => {
            let layer_id = find_layer(model, &name)?;
            model.remove_layer(layer_id)?;
        }
        LayerCommandArg::Lock { name } => {
            let layer_id = find_layer(model, &name)?;
            model.toggle_layer_lock(layer_id)?;
        }
        LayerCommandArg::Show { name } => {
            let layer_id = find_layer(model, &name)?;
            model.toggle_layer_show(layer_id)?;
        }
        LayerCommandArg::Activate { name } => {
            let layer_id = find_layer(model, &name)?;
            model.activate_layer(layer_id)?;
            if model.active_layer().map(|layer| layer.id) != Some(layer_id) {
                bail!("Layer '{}' ist gesperrt oder versteckt", name);
            }
        }
        LayerCommandArg::Deactivate => {
            if let Some(layer_id) = model.active_layer().map(|layer| layer.id) {
                model.deactivate_layer(layer_id)?;
            }
        }
    }
    Ok(())
}

fn list(model: &DocumentModel) {
    for view in model.store().layer_views() {
        let mut flags = Vec::new();
        if view.active {
            flags.push("aktiv");
        }
        if view.locked {
            flags.push("gesperrt");
        }
        if view.hidden {
            flags.push("versteckt");
        }
        let count = model.store().layer_features(view.id).count();
        if flags.is_empty() {
            println!("{} ({} Features)", view.name, count);
        } else {
            println!("{} ({} Features) [{}]", view.name, count, flags.join(", "));
        }
    }
}

fn find_layer(model: &DocumentModel, name: &str) -> Result<LayerId> {
    model
        .layer(name)
        .map(|layer| layer.id)
        .with_context(|| format!("Layer '{}' nicht gefunden", name))
}

fn layer_name(model: &DocumentModel, layer_id: LayerId) -> String {
    model
        .store()
        .layer(layer_id)
        .map(|layer| layer.name.clone())
        .unwrap_or_default()
}

fn read_document(path: &Path) -> Result<LayerDocument> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("Ungültiger Dateiname: {}", path.display()))?;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Datei nicht lesbar: {}", path.display()))?;
    Ok(LayerDocument::new(name, contents))
}
