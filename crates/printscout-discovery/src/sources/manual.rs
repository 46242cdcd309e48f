// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Read-only view of the manually configured printer cache.
//
// The outer application owns the cache file (`uri -> entry` as JSON) and
// writes it; discovery only reads it.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use printscout_core::error::Result;
use printscout_core::types::ManualEntry;

/// Supplies saved printer entries in a stable order.
pub trait ManualPrinterCache: Send + Sync {
    fn entries(&self) -> Vec<(String, ManualEntry)>;
}

/// In-memory cache keyed (and therefore ordered) by URI.
#[derive(Debug, Clone, Default)]
pub struct ManualCache {
    entries: BTreeMap<String, ManualEntry>,
}

impl ManualCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the JSON cache document. A missing file is an empty cache.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no manual printer cache");
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, ManualEntry> = serde_json::from_str(&text)?;
        debug!(path = %path.display(), entries = entries.len(), "loaded manual printer cache");
        Ok(Self { entries })
    }

    pub fn insert(&mut self, uri: impl Into<String>, entry: ManualEntry) {
        self.entries.insert(uri.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ManualEntry)> for ManualCache {
    fn from_iter<I: IntoIterator<Item = (String, ManualEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl ManualPrinterCache for ManualCache {
    fn entries(&self) -> Vec<(String, ManualEntry)> {
        self.entries
            .iter()
            .map(|(uri, entry)| (uri.clone(), entry.clone()))
            .collect()
    }
}
