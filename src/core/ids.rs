//! Identitäts-Schema für Layer und Features.
//!
//! Layer-IDs und Feature-IDs werden prozessweit fortlaufend vergeben und nie
//! wiederverwendet. Eine Feature-ID trägt die ID ihres Layers in sich, damit
//! `FeatureId::layer_id()` ohne Lookup funktioniert.
//!
//! Textform (z.B. für Clipboard-Inhalte und Logs):
//! - `layer:<n>`
//! - `feature:<layer>/<n>`

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Schema-Präfix für Layer-IDs.
pub const SCHEME_LAYER: &str = "layer";
/// Schema-Präfix für Feature-IDs.
pub const SCHEME_FEATURE: &str = "feature";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_raw_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Eindeutige ID eines Input-Layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    /// Vergibt eine neue, noch nie benutzte Layer-ID.
    pub fn generate() -> Self {
        Self(next_raw_id())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", SCHEME_LAYER, self.0)
    }
}

/// Eindeutige ID eines Features; enthält die ID des besitzenden Layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId {
    layer: LayerId,
    seq: u64,
}

impl FeatureId {
    /// Vergibt eine neue Feature-ID im angegebenen Layer.
    pub fn generate(layer: LayerId) -> Self {
        Self {
            layer,
            seq: next_raw_id(),
        }
    }

    /// Layer, zu dem das Feature gehört.
    pub fn layer_id(self) -> LayerId {
        self.layer
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", SCHEME_FEATURE, self.layer.0, self.seq)
    }
}

/// Ressourcen-Art einer ID (steuert u.a. die Clipboard-Zuordnung).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Layer-IDs
    Layer,
    /// Feature-IDs
    Feature,
}

/// Selektierbare ID: entweder Layer oder Feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// Ein Layer
    Layer(LayerId),
    /// Ein Feature
    Feature(FeatureId),
}

impl ResourceId {
    /// Klassifiziert die ID.
    pub fn kind(self) -> ResourceKind {
        match self {
            ResourceId::Layer(_) => ResourceKind::Layer,
            ResourceId::Feature(_) => ResourceKind::Feature,
        }
    }

    /// `true` für Layer-IDs.
    pub fn is_layer_id(self) -> bool {
        matches!(self, ResourceId::Layer(_))
    }

    /// `true` für Feature-IDs.
    pub fn is_feature_id(self) -> bool {
        matches!(self, ResourceId::Feature(_))
    }

    /// Liefert die Layer-ID, falls es sich um einen Layer handelt.
    pub fn as_layer(self) -> Option<LayerId> {
        match self {
            ResourceId::Layer(id) => Some(id),
            ResourceId::Feature(_) => None,
        }
    }

    /// Liefert die Feature-ID, falls es sich um ein Feature handelt.
    pub fn as_feature(self) -> Option<FeatureId> {
        match self {
            ResourceId::Feature(id) => Some(id),
            ResourceId::Layer(_) => None,
        }
    }

    /// Layer-ID der Ressource (bei Features der besitzende Layer).
    pub fn layer_id(self) -> LayerId {
        match self {
            ResourceId::Layer(id) => id,
            ResourceId::Feature(id) => id.layer_id(),
        }
    }
}

impl From<LayerId> for ResourceId {
    fn from(id: LayerId) -> Self {
        ResourceId::Layer(id)
    }
}

impl From<FeatureId> for ResourceId {
    fn from(id: FeatureId) -> Self {
        ResourceId::Feature(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Layer(id) => id.fmt(f),
            ResourceId::Feature(id) => id.fmt(f),
        }
    }
}

impl FromStr for ResourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Ungültige Ressourcen-ID: {s}"))?;

        match scheme {
            SCHEME_LAYER => Ok(ResourceId::Layer(LayerId(rest.parse()?))),
            SCHEME_FEATURE => {
                let (layer, seq) = rest
                    .split_once('/')
                    .ok_or_else(|| anyhow::anyhow!("Feature-ID ohne Layer-Anteil: {s}"))?;
                Ok(ResourceId::Feature(FeatureId {
                    layer: LayerId(layer.parse()?),
                    seq: seq.parse()?,
                }))
            }
            other => anyhow::bail!("Unbekanntes ID-Schema '{other}' in {s}"),
        }
    }
}

impl FromStr for LayerId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ResourceId>()?
            .as_layer()
            .ok_or_else(|| anyhow::anyhow!("Keine Layer-ID: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = LayerId::generate();
        let b = LayerId::generate();
        assert_ne!(a, b);

        let f1 = FeatureId::generate(a);
        let f2 = FeatureId::generate(a);
        assert_ne!(f1, f2);
    }

    #[test]
    fn feature_id_embeds_layer_id() {
        let layer = LayerId::generate();
        let feature = FeatureId::generate(layer);
        assert_eq!(feature.layer_id(), layer);
        assert_eq!(ResourceId::from(feature).layer_id(), layer);
    }

    #[test]
    fn classification_predicates() {
        let layer = LayerId::generate();
        let feature = FeatureId::generate(layer);

        assert!(ResourceId::from(layer).is_layer_id());
        assert!(!ResourceId::from(layer).is_feature_id());
        assert!(ResourceId::from(feature).is_feature_id());
        assert_eq!(ResourceId::from(feature).kind(), ResourceKind::Feature);
    }

    #[test]
    fn text_form_parses_back() {
        let layer = LayerId::generate();
        let feature = FeatureId::generate(layer);

        let parsed: ResourceId = feature.to_string().parse().unwrap();
        assert_eq!(parsed, ResourceId::Feature(feature));

        let parsed: LayerId = layer.to_string().parse().unwrap();
        assert_eq!(parsed, layer);
    }

    #[test]
    fn invalid_text_is_rejected() {
        assert!("layer".parse::<ResourceId>().is_err());
        assert!("feature:12".parse::<ResourceId>().is_err());
        assert!("node:1".parse::<ResourceId>().is_err());
        assert!("layer:abc".parse::<ResourceId>().is_err());
    }
}
