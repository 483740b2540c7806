//! Vector boundary datasets and region lookup by name.

pub mod geojson;
pub mod record;
pub mod resolver;

pub use record::{BoundaryDataset, BoundaryRecord, BoundarySource};
pub use resolver::{
    BoundaryResolver, PartSelection, ResolvedRegion, ResolverConfig, DEFAULT_NAME_KEYS,
};
