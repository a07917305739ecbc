//! Free-text location to region resolution.
//!
//! Builds a lookup table of lowercase needles (every region keyword and
//! state name) sorted by length descending, so specific multi-word matches
//! like "victoria island" win over short generic ones. Resolution is a pure
//! substring scan; the table is immutable once built and safe to share
//! across readers.

use std::sync::{Arc, PoisonError, RwLock};

use super::RegionProfile;

/// Immutable needle table mapping location substrings to region ids.
#[derive(Debug, Clone)]
pub struct RegionResolver {
    /// `(needle, region_id)` pairs, longest needle first.
    table: Vec<(String, String)>,
}

impl RegionResolver {
    /// Build the lookup table from a catalog snapshot. Pure; no I/O.
    pub fn build(regions: &[RegionProfile]) -> Self {
        let mut table: Vec<(String, String)> = Vec::new();
        for region in regions {
            for keyword in &region.keywords {
                table.push((keyword.to_lowercase(), region.id.clone()));
            }
            for state in &region.states {
                table.push((state.to_lowercase(), region.id.clone()));
            }
        }
        // Longest needle first so specific matches beat generic ones.
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { table }
    }

    /// Match a free-text location to a region id.
    ///
    /// Empty or whitespace-only input resolves to `None`; so does a
    /// location containing no known needle. A miss is not an error.
    pub fn resolve(&self, location: &str) -> Option<&str> {
        if location.trim().is_empty() {
            return None;
        }
        let location_lower = location.to_lowercase();
        self.table
            .iter()
            .find(|(needle, _)| location_lower.contains(needle.as_str()))
            .map(|(_, region_id)| region_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

static SHARED: RwLock<Option<Arc<RegionResolver>>> = RwLock::new(None);

/// Process-wide resolver, built once from the given catalog snapshot.
///
/// Later calls return the cached table regardless of the argument; call
/// [`rebuild`] when the catalog changes.
pub fn shared(regions: &[RegionProfile]) -> Arc<RegionResolver> {
    if let Some(resolver) = SHARED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Arc::clone(resolver);
    }
    rebuild(regions)
}

/// Replace the process-wide resolver with one built from a fresh snapshot.
pub fn rebuild(regions: &[RegionProfile]) -> Arc<RegionResolver> {
    let resolver = Arc::new(RegionResolver::build(regions));
    *SHARED.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&resolver));
    resolver
}
