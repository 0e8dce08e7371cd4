//! Layer-Dokumente als `<name>.json`-Dateien in einem Projektverzeichnis.

use super::{LayerDocument, LayerIo};
use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Dateibasiertes Gateway: ein Layer = eine Datei im Projektverzeichnis.
#[derive(Debug, Clone)]
pub struct DirectoryIo {
    root: PathBuf,
}

impl DirectoryIo {
    /// Öffnet (und erstellt bei Bedarf) das Projektverzeichnis.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Projektverzeichnis {} nicht anlegbar", root.display()))?;
        Ok(Self { root })
    }

    /// Projektverzeichnis.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            bail!("Ungültiger Layer-Name für Dateisystem: '{}'", name);
        }
        Ok(self.root.join(format!("{name}.{EXTENSION}")))
    }
}

impl LayerIo for DirectoryIo {
    fn load_layers(&self) -> Result<Vec<LayerDocument>> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("Verzeichnis {} nicht lesbar", self.root.display()))?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("Datei mit nicht-UTF-8-Namen übersprungen: {}", path.display());
                continue;
            };
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Layer-Datei {} nicht lesbar", path.display()))?;
            documents.push(LayerDocument::new(name, contents));
        }

        documents.sort_by(|a, b| a.name.cmp(&b.name));
        log::info!(
            "{} Layer-Dokument(e) in {} gefunden",
            documents.len(),
            self.root.display()
        );
        Ok(documents)
    }

    fn read_layer(&self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        std::fs::read_to_string(&path)
            .with_context(|| format!("Layer-Datei {} nicht lesbar", path.display()))
    }

    fn create_layer(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.path(name)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Layer-Datei {} nicht anlegbar", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Layer-Datei {} nicht schreibbar", path.display()))?;
        log::debug!("Layer '{}' angelegt ({} Bytes)", name, contents.len());
        Ok(())
    }

    fn write_layer(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.path(name)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Layer-Datei {} nicht schreibbar", path.display()))?;
        log::debug!("Layer '{}' geschrieben ({} Bytes)", name, contents.len());
        Ok(())
    }

    fn rename_layer(&mut self, prev_name: &str, next_name: &str) -> Result<()> {
        let from = self.path(prev_name)?;
        let to = self.path(next_name)?;
        // Gleicher Name bis auf Groß-/Kleinschreibung ist auf manchen Dateisystemen dieselbe Datei
        if to.exists() && !prev_name.eq_ignore_ascii_case(next_name) {
            bail!("Layer-Datei {} existiert bereits", to.display());
        }
        std::fs::rename(&from, &to).with_context(|| {
            format!(
                "Umbenennen {} -> {} fehlgeschlagen",
                from.display(),
                to.display()
            )
        })
    }

    fn delete_layer(&mut self, name: &str) -> Result<()> {
        let path = self.path(name)?;
        std::fs::remove_file(&path)
            .with_context(|| format!("Layer-Datei {} nicht löschbar", path.display()))
    }
}
