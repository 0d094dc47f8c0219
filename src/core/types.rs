use serde::{Deserialize, Serialize};

use crate::core::contig::Strand;

/// Sequential identifier of a connected component, starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub usize);

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a contig sits on a component's coordinate line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub contig: String,
    /// Inclusive start
    pub start: u64,
    /// Exclusive end
    pub end: u64,
    pub strand: Strand,
}

impl Placement {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position < self.end
    }
}

/// Placements of every contig of one component, sorted by start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateMap {
    placements: Vec<Placement>,
}

impl CoordinateMap {
    /// Build a map from placements in any order
    pub fn new(mut placements: Vec<Placement>) -> Self {
        placements.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
        Self { placements }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement> {
        self.placements.iter()
    }

    pub fn get(&self, contig: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.contig == contig)
    }

    /// Rank of a contig in coordinate order
    pub fn rank(&self, contig: &str) -> Option<usize> {
        self.placements.iter().position(|p| p.contig == contig)
    }

    /// Sum of placement lengths
    pub fn total_length(&self) -> u64 {
        self.placements.iter().map(Placement::len).sum()
    }

    /// Placement covering `position`, if any
    pub fn placement_at(&self, position: u64) -> Option<(usize, &Placement)> {
        let idx = self.placements.partition_point(|p| p.end <= position);
        self.placements
            .get(idx)
            .filter(|p| p.contains(position))
            .map(|p| (idx, p))
    }

    /// Check that the placements tile `[0, total_length)` with no gaps and no
    /// overlaps. Returns the first offending position on failure.
    pub fn check_tiling(&self) -> Result<(), u64> {
        let mut cursor = 0;
        for p in &self.placements {
            if p.start != cursor {
                return Err(cursor.min(p.start));
            }
            cursor = p.end;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CoordinateMap {
    type Item = &'a Placement;
    type IntoIter = std::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}

/// One depth value per position of a component's coordinate line
pub type CoverageProfile = Vec<u32>;

/// Coverage statistics of a final component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Number of positions in the coverage profile
    pub span: u64,
    /// Population mean of the profile, NaN when empty
    pub mean: f64,
    /// Population standard deviation of the profile, NaN when empty
    pub std_dev: f64,
}

impl SummaryRecord {
    pub fn from_profile(profile: &[u32]) -> Self {
        if profile.is_empty() {
            return Self {
                span: 0,
                mean: f64::NAN,
                std_dev: f64::NAN,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let n = profile.len() as f64;
        let mean = profile.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let variance = profile
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            span: profile.len() as u64,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}
