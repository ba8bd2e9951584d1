//! Static classification tables.
//!
//! The registry is built once per dispatcher and read without locking
//! afterwards. Runtime state (feature indexes) lives in
//! [`FeatureIndexTable`](crate::index::FeatureIndexTable).

use std::collections::HashMap;

use hidpp_errors::{RegistryError, Result};
use hidpp_fields::Schema;
use hidpp_messages::catalog::{self, CatalogEntry, RegisterCatalogEntry};
use tracing::trace;

/// `(feature_id, version, function) -> record` lookup.
///
/// Exact entries answer first; range entries are scanned only when no
/// exact entry exists for the key.
#[derive(Debug, Default, Clone)]
pub struct FeatureTable {
    exact: HashMap<(u16, u8, u8), &'static Schema>,
    ranges: Vec<CatalogEntry>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from catalog entries.
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` if two exact entries share a key.
    pub fn from_entries(entries: &[CatalogEntry]) -> Result<Self> {
        let mut table = Self::new();
        for entry in entries {
            table.insert(*entry)?;
        }
        Ok(table)
    }

    /// # Errors
    ///
    /// `DuplicateEntry` if an exact entry with the same key exists.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<()> {
        if !entry.is_exact() {
            self.ranges.push(entry);
            return Ok(());
        }
        let key = (entry.feature_id, entry.versions[0], entry.functions[0]);
        if self.exact.contains_key(&key) {
            return Err(RegistryError::DuplicateEntry {
                feature_id: key.0,
                version: key.1,
                function: key.2,
            }
            .into());
        }
        self.exact.insert(key, entry.schema);
        Ok(())
    }

    /// Resolve a key to a record schema.
    ///
    /// # Errors
    ///
    /// `AmbiguousRegistryMapping` if several range entries cover the key.
    pub fn lookup(&self, feature_id: u16, version: u8, function: u8) -> Result<Option<&'static Schema>> {
        if let Some(schema) = self.exact.get(&(feature_id, version, function)) {
            return Ok(Some(*schema));
        }
        let candidates: Vec<&CatalogEntry> = self
            .ranges
            .iter()
            .filter(|entry| entry.covers(feature_id, version, function))
            .collect();
        match candidates.as_slice() {
            [] => Ok(None),
            [entry] => {
                trace!(feature_id, version, function, schema = entry.schema.name(), "range entry");
                Ok(Some(entry.schema))
            }
            _ => Err(RegistryError::AmbiguousRegistryMapping {
                feature_id,
                version,
                function,
                candidates: candidates
                    .iter()
                    .map(|entry| entry.schema.name().to_string())
                    .collect(),
            }
            .into()),
        }
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.ranges.is_empty()
    }
}

/// HID++ 1.0 `(sub_id, address, r0) -> record` lookup; the most specific
/// matching entry wins.
#[derive(Debug, Default, Clone)]
pub struct RegisterTable {
    entries: Vec<RegisterCatalogEntry>,
}

impl RegisterTable {
    pub fn from_entries(entries: &[RegisterCatalogEntry]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    pub fn insert(&mut self, entry: RegisterCatalogEntry) {
        self.entries.push(entry);
    }

    /// Whether any entry answers `sub_id`.
    pub fn knows_sub_id(&self, sub_id: u8) -> bool {
        self.entries.iter().any(|entry| entry.sub_id == sub_id)
    }

    /// # Errors
    ///
    /// `AmbiguousRegistryMapping` if two different records match with the
    /// same specificity.
    pub fn lookup(&self, sub_id: u8, address: u8, r0: u8) -> Result<Option<&'static Schema>> {
        let mut best: Vec<&RegisterCatalogEntry> = Vec::new();
        for entry in self.entries.iter().filter(|entry| entry.matches(sub_id, address, r0)) {
            match best.first().map(|current| current.specificity()) {
                Some(current) if entry.specificity() < current => {}
                Some(current) if entry.specificity() == current => best.push(entry),
                _ => best = vec![entry],
            }
        }
        best.dedup_by(|a, b| std::ptr::eq(a.schema, b.schema));
        match best.as_slice() {
            [] => Ok(None),
            [entry] => Ok(Some(entry.schema)),
            _ => Err(RegistryError::AmbiguousRegistryMapping {
                feature_id: u16::from(sub_id),
                version: address,
                function: r0,
                candidates: best.iter().map(|entry| entry.schema.name().to_string()).collect(),
            }
            .into()),
        }
    }
}

/// Every static table the classifier consults.
#[derive(Debug, Default, Clone)]
pub struct FeatureRegistry {
    pub responses: FeatureTable,
    pub events: FeatureTable,
    pub vlp_responses: FeatureTable,
    pub vlp_events: FeatureTable,
    pub receiver_responses: RegisterTable,
    pub receiver_events: RegisterTable,
}

impl FeatureRegistry {
    /// An empty registry, to be filled with `insert` calls.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry of every record declared in `hidpp-messages`.
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` if the catalog declares a key twice.
    pub fn standard() -> Result<Self> {
        Ok(Self {
            responses: FeatureTable::from_entries(catalog::RESPONSES)?,
            events: FeatureTable::from_entries(catalog::EVENTS)?,
            vlp_responses: FeatureTable::from_entries(catalog::VLP_RESPONSES)?,
            vlp_events: FeatureTable::from_entries(catalog::VLP_EVENTS)?,
            receiver_responses: RegisterTable::from_entries(catalog::RECEIVER_RESPONSES),
            receiver_events: RegisterTable::from_entries(catalog::RECEIVER_EVENTS),
        })
    }

    /// Resolve a HID++ 2.0 key. Events are tried before responses when
    /// `is_event` is set.
    ///
    /// # Errors
    ///
    /// `AmbiguousRegistryMapping` from either table.
    pub fn resolve(
        &self,
        feature_id: u16,
        version: u8,
        function: u8,
        is_event: bool,
    ) -> Result<Option<&'static Schema>> {
        if is_event {
            if let Some(schema) = self.events.lookup(feature_id, version, function)? {
                return Ok(Some(schema));
            }
        }
        self.responses.lookup(feature_id, version, function)
    }

    /// Resolve a VLP key: responses for requests and error reports, events
    /// otherwise.
    ///
    /// # Errors
    ///
    /// `AmbiguousRegistryMapping` from either table.
    pub fn resolve_vlp(
        &self,
        feature_id: u16,
        version: u8,
        function: u8,
        use_responses: bool,
    ) -> Result<Option<&'static Schema>> {
        if use_responses {
            self.vlp_responses.lookup(feature_id, version, function)
        } else {
            self.vlp_events.lookup(feature_id, version, function)
        }
    }

    /// Resolve a HID++ 1.0 register access or notification: responses
    /// first, then events.
    ///
    /// # Errors
    ///
    /// `AmbiguousRegistryMapping` from either table.
    pub fn resolve_register(&self, sub_id: u8, address: u8, r0: u8) -> Result<Option<&'static Schema>> {
        if let Some(schema) = self.receiver_responses.lookup(sub_id, address, r0)? {
            return Ok(Some(schema));
        }
        self.receiver_events.lookup(sub_id, address, r0)
    }

    pub fn knows_sub_id(&self, sub_id: u8) -> bool {
        self.receiver_responses.knows_sub_id(sub_id) || self.receiver_events.knows_sub_id(sub_id)
    }
}
