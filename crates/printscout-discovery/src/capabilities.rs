// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability defaults for discovered printers.
//
// Discovery does not speak IPP Get-Printer-Attributes; every record gets the
// same descriptor, which matches what the supported consumer inkjets and
// office multifunctions can do. A real attribute query would replace
// `estimate` without changing its signature.

use printscout_core::types::{Capabilities, PrintQuality};

/// Media names reported for every printer.
pub const DEFAULT_MEDIA: &[&str] = &["A4", "Letter", "Legal", "4x6", "5x7"];

/// Most copies a single job may request.
pub const DEFAULT_MAX_COPIES: u32 = 99;

/// Attaches capability descriptors to discovery results.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityEstimator;

impl CapabilityEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Descriptor for the printer at `uri`. Deterministic: the URI does not
    /// influence the result.
    pub fn estimate(&self, _uri: &str) -> Capabilities {
        Capabilities {
            duplex: true,
            color: true,
            max_copies: DEFAULT_MAX_COPIES,
            supported_media: DEFAULT_MEDIA.iter().map(|m| m.to_string()).collect(),
            supported_quality: vec![PrintQuality::Draft, PrintQuality::Normal, PrintQuality::High],
        }
    }
}
