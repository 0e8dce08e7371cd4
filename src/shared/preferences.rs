//! Benutzer-Präferenzen (u.a. der aktive Layer, per Name).

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key für den Namen des aktiven Layers.
pub const ACTIVE_LAYER: &str = "activeLayer";

/// Key/Value-Präferenzen.
pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Präferenzen als TOML-Datei; jede Änderung wird sofort geschrieben.
#[derive(Debug, Clone)]
pub struct TomlPreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferences {
    /// Lädt die Datei; fehlt sie oder ist sie fehlerhaft, startet mit leeren Werten.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                log::warn!(
                    "Präferenzen {} fehlerhaft, starte leer: {}",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }),
            Err(_) => {
                log::debug!("Keine Präferenzen unter {} gefunden", path.display());
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    /// Pfad der Präferenz-Datei.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Präferenzen {} nicht schreibbar", self.path.display()))
    }
}

impl Preferences for TomlPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// Präferenzen im Speicher; Klone teilen sich die Werte.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_preferences_persist_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let mut prefs = TomlPreferences::load(&path);
        assert_eq!(prefs.get(ACTIVE_LAYER), None);
        prefs.set(ACTIVE_LAYER, "Roads").unwrap();

        let reloaded = TomlPreferences::load(&path);
        assert_eq!(reloaded.get(ACTIVE_LAYER).as_deref(), Some("Roads"));
    }

    #[test]
    fn toml_preferences_remove_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let mut prefs = TomlPreferences::load(&path);
        prefs.set(ACTIVE_LAYER, "Roads").unwrap();
        prefs.remove(ACTIVE_LAYER).unwrap();

        assert_eq!(TomlPreferences::load(&path).get(ACTIVE_LAYER), None);
    }

    #[test]
    fn memory_preferences_share_values_between_clones() {
        let prefs = MemoryPreferences::new();
        let mut handle = prefs.clone();
        handle.set(ACTIVE_LAYER, "Lakes").unwrap();
        assert_eq!(prefs.get(ACTIVE_LAYER).as_deref(), Some("Lakes"));
    }
}
