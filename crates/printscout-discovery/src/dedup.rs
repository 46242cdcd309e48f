// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// First-seen-wins deduplication by URI.

use std::collections::HashSet;

use tracing::debug;

use printscout_core::types::PrinterRecord;

/// Keep the first record for each URI and drop later ones whole.
///
/// The aggregate is ordered by source priority, so the survivor for a shared
/// URI is always the one from the highest-priority source. No fields are
/// merged between duplicates.
pub fn dedup(records: Vec<PrinterRecord>) -> Vec<PrinterRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let before = records.len();

    let unique: Vec<PrinterRecord> = records
        .into_iter()
        .filter(|r| {
            let first = seen.insert(r.uri.clone());
            if !first {
                debug!(uri = %r.uri, source = %r.source, "dropping duplicate record");
            }
            first
        })
        .collect();

    debug!(before, after = unique.len(), "deduplicated records");
    unique
}
