//! Core-Domänentypen: IDs, Layer, Features und der Layer-Bestand.

pub mod feature;
pub mod ids;
pub mod layer;
pub mod store;

pub use feature::{
    is_internal_property, Feature, Geometry, ParsedFeature, Position, Properties,
    INTERNAL_PROPERTIES,
};
pub use ids::{FeatureId, LayerId, ResourceId, ResourceKind, SCHEME_FEATURE, SCHEME_LAYER};
pub use layer::{Layer, LayerView};
pub use store::{disambiguate, LayerStore};
