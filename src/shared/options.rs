//! Zentrale Konfiguration des Layer-Modells.
//!
//! `ModelOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

/// Maximale Anzahl Undo-Schritte.
pub const HISTORY_DEPTH: usize = 200;
/// Basisname für neu erstellte Layer.
pub const NEW_LAYER_NAME: &str = "New Layer";

/// Alle zur Laufzeit änderbaren Modell-Optionen.
/// Wird als `input_layers.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelOptions {
    /// Maximale Tiefe der Undo-History
    pub history_depth: usize,
    /// Basisname für `create_layer` (wird bei Kollision disambiguiert)
    pub new_layer_name: String,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            history_depth: HISTORY_DEPTH,
            new_layer_name: NEW_LAYER_NAME.to_string(),
        }
    }
}

impl ModelOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("input-layers"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("input_layers.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = ModelOptions::load_from_file(&dir.path().join("fehlt.toml"));
        assert_eq!(options, ModelOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_layers.toml");
        std::fs::write(&path, "history_depth = 5\n").unwrap();

        let options = ModelOptions::load_from_file(&path);
        assert_eq!(options.history_depth, 5);
        assert_eq!(options.new_layer_name, NEW_LAYER_NAME);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_layers.toml");
        std::fs::write(&path, "history_depth = \"viele\"").unwrap();

        assert_eq!(ModelOptions::load_from_file(&path), ModelOptions::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_layers.toml");
        let options = ModelOptions {
            history_depth: 12,
            new_layer_name: "Neuer Layer".into(),
        };

        options.save_to_file(&path).unwrap();
        assert_eq!(ModelOptions::load_from_file(&path), options);
    }
}
