//! Runtime `feature_index -> (feature_id, feature_version)` tables.
//!
//! Devices assign feature indexes per session, so the table is filled as
//! the host queries the root feature. The inverse mapping stays unique:
//! registering a `(feature_id, version)` pair under a new index evicts the
//! index that held it before.

use std::collections::BTreeMap;

use hidpp_messages::ids::{error_tags, feature_ids};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which wire family a table serves; decides the seeded error entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFamily {
    Hidpp,
    Vlp,
}

/// Feature identity announced for one feature index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureKey {
    pub feature_id: u16,
    pub version: u8,
}

impl FeatureKey {
    pub const fn new(feature_id: u16, version: u8) -> Self {
        Self {
            feature_id,
            version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureIndexTable {
    family: IndexFamily,
    entries: BTreeMap<u8, FeatureKey>,
}

impl FeatureIndexTable {
    /// A table holding only the seeded error entries of `family`.
    pub fn new(family: IndexFamily) -> Self {
        let mut table = Self {
            family,
            entries: BTreeMap::new(),
        };
        table.seed();
        table
    }

    pub fn hidpp() -> Self {
        Self::new(IndexFamily::Hidpp)
    }

    pub fn vlp() -> Self {
        Self::new(IndexFamily::Vlp)
    }

    fn seed(&mut self) {
        match self.family {
            IndexFamily::Hidpp => {
                self.entries
                    .insert(error_tags::HIDPP2, FeatureKey::new(feature_ids::HIDPP2_ERROR, 0));
                self.entries
                    .insert(error_tags::HIDPP1, FeatureKey::new(feature_ids::HIDPP1_ERROR, 0));
            }
            IndexFamily::Vlp => {
                self.entries
                    .insert(error_tags::VLP, FeatureKey::new(feature_ids::HIDPP2_ERROR, 0));
            }
        }
    }

    pub fn family(&self) -> IndexFamily {
        self.family
    }

    /// Register `feature_index` for `(feature_id, version)`.
    ///
    /// Returns the index evicted to keep the inverse mapping unique, if any.
    pub fn add(&mut self, feature_index: u8, feature_id: u16, version: u8) -> Option<u8> {
        let key = FeatureKey::new(feature_id, version);
        let evicted = self
            .index_of(feature_id, version)
            .filter(|previous| *previous != feature_index);
        if let Some(previous) = evicted {
            self.entries.remove(&previous);
            debug!(
                family = ?self.family,
                feature_id,
                version,
                previous,
                feature_index,
                "feature moved to a new index"
            );
        }
        self.entries.insert(feature_index, key);
        debug!(
            family = ?self.family,
            feature_index,
            feature_id,
            version,
            "feature entry added"
        );
        evicted
    }

    /// Drop every runtime entry and restore the seeded error entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.seed();
        debug!(family = ?self.family, "feature entries cleared");
    }

    pub fn get(&self, feature_index: u8) -> Option<FeatureKey> {
        self.entries.get(&feature_index).copied()
    }

    pub fn index_of(&self, feature_id: u16, version: u8) -> Option<u8> {
        let key = FeatureKey::new(feature_id, version);
        self.entries
            .iter()
            .find(|(_, value)| **value == key)
            .map(|(index, _)| *index)
    }

    /// Entries in feature index order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, FeatureKey)> + '_ {
        self.entries.iter().map(|(index, key)| (*index, *key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
