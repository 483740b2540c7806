//! Boundary records and the sources that provide them.

use std::collections::HashMap;

use relief_common::Geometry;

/// One administrative region: attribute columns plus its outline.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    attributes: HashMap<String, String>,
    geometry: Geometry,
}

impl BoundaryRecord {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            attributes: HashMap::new(),
            geometry,
        }
    }

    /// Set an attribute column.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

/// Anything that can list boundary records.
pub trait BoundarySource {
    fn records(&self) -> &[BoundaryRecord];
}

/// In-memory collection of boundary records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryDataset {
    records: Vec<BoundaryRecord>,
}

impl BoundaryDataset {
    pub fn new(records: Vec<BoundaryRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: BoundaryRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BoundarySource for BoundaryDataset {
    fn records(&self) -> &[BoundaryRecord] {
        &self.records
    }
}

impl FromIterator<BoundaryRecord> for BoundaryDataset {
    fn from_iter<I: IntoIterator<Item = BoundaryRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
