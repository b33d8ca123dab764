use serde::{Deserialize, Serialize};

/// A linear ring as (x, y) = (longitude, latitude) pairs.
pub type Ring = Vec<(f64, f64)>;

/// One polygon part: exterior ring first, holes after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonPart {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl PolygonPart {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    pub fn vertex_count(&self) -> usize {
        self.exterior.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }
}

/// Boundary of a single tract. Multi-part tracts (islands) carry several parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractFeature {
    pub tract: String,
    pub parts: Vec<PolygonPart>,
}

impl TractFeature {
    pub fn new(tract: &str, parts: Vec<PolygonPart>) -> Self {
        Self {
            tract: tract.to_string(),
            parts,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(PolygonPart::vertex_count).sum()
    }
}

/// Tract features for a county plus what was skipped while reading them.
#[derive(Debug, Clone, Default)]
pub struct GeometryCollection {
    pub features: Vec<TractFeature>,
    pub skipped_features: usize,
    pub transfer_limit_exceeded: bool,
}

impl GeometryCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
