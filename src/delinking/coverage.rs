//! Per-base depth lookup and its projection onto component coordinates.

use std::collections::HashMap;

use crate::core::types::{CoordinateMap, CoverageProfile};
use crate::delinking::DelinkError;

/// Per-base depth of every contig, keyed by contig id.
///
/// Contigs keep the order in which they were inserted so that contigs absent
/// from the scaffold graph can be reported deterministically.
#[derive(Debug, Clone, Default)]
pub struct CoverageTable {
    depths: HashMap<String, Vec<u32>>,
    order: Vec<String>,
}

impl CoverageTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depths of a contig, replacing any earlier values
    pub fn insert(&mut self, contig: impl Into<String>, depths: Vec<u32>) {
        let contig = contig.into();
        if !self.depths.contains_key(&contig) {
            self.order.push(contig.clone());
        }
        self.depths.insert(contig, depths);
    }

    /// Append one depth value to a contig, creating it if needed
    pub fn push(&mut self, contig: &str, depth: u32) {
        if let Some(values) = self.depths.get_mut(contig) {
            values.push(depth);
        } else {
            self.order.push(contig.to_string());
            self.depths.insert(contig.to_string(), vec![depth]);
        }
    }

    pub fn depths(&self, contig: &str) -> Option<&[u32]> {
        self.depths.get(contig).map(Vec::as_slice)
    }

    /// Contig length, taken from the number of depth values
    pub fn length(&self, contig: &str) -> Option<u64> {
        self.depths.get(contig).map(|d| d.len() as u64)
    }

    pub fn contains(&self, contig: &str) -> bool {
        self.depths.contains_key(contig)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Contig ids in insertion order
    pub fn contigs(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }
}

/// Build the coverage profile of a component.
///
/// Each contig's depths are copied to the offset of its placement, reversed
/// when the contig sits on the reverse strand. The placements must tile the
/// coordinate line exactly and each contig must have as many depth values as
/// its placement is long.
///
/// # Errors
///
/// Returns `DelinkError::Tiling` if a position would be filled zero or
/// several times, `DelinkError::MissingCoverage` if a contig has no depths,
/// or `DelinkError::LengthMismatch` if a contig's depths do not fit its
/// placement.
pub fn aggregate(
    table: &CoverageTable,
    coords: &CoordinateMap,
) -> Result<CoverageProfile, DelinkError> {
    coords.check_tiling().map_err(DelinkError::Tiling)?;

    let total = usize::try_from(coords.total_length())
        .map_err(|_| DelinkError::Tiling(coords.total_length()))?;
    let mut profile = Vec::with_capacity(total);

    for placement in coords {
        let depths = table
            .depths(&placement.contig)
            .ok_or_else(|| DelinkError::MissingCoverage(placement.contig.clone()))?;

        if depths.len() as u64 != placement.len() {
            return Err(DelinkError::LengthMismatch {
                contig: placement.contig.clone(),
                expected: placement.len(),
                actual: depths.len() as u64,
            });
        }

        if placement.strand.is_reverse() {
            profile.extend(depths.iter().rev());
        } else {
            profile.extend_from_slice(depths);
        }
    }

    Ok(profile)
}
