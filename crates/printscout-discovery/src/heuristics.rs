// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vendor heuristics: keyword classification and model normalisation.
//
// The tables are plain data held in a `VendorProfile` and handed to the
// classifier at construction time, so a different vendor (or a test) can
// supply its own.

use std::net::IpAddr;

use regex::Regex;
use tracing::debug;

use printscout_core::error::{Result, ScoutError};

/// Keywords that mark a Canon device in a banner or printer name.
pub const CANON_KEYWORDS: &[&str] = &[
    "canon",
    "pixma",
    "imageclass",
    "maxify",
    "selphy",
    "imagerunner",
    "ij",
    "mb",
    "mx",
    "mp",
    "mg",
    "mf",
];

/// Model patterns, applied in order to the upper-cased name. Capture group 1
/// is the model designation.
pub const CANON_MODEL_PATTERNS: &[&str] = &[
    r"PIXMA\s+([A-Z]+\d+)",
    r"(MX\d+[A-Z]*)",
    r"(MP\d+[A-Z]*)",
    r"(MG\d+[A-Z]*)",
    r"(MF\d+[A-Z]*)",
    r"(MB\d+[A-Z]*)",
    r"IMAGECLASS\s+([A-Z]+\d+)",
    r"IMAGERUNNER\s+([A-Z]+\d+)",
];

const TITLE_PATTERN: &str = r"(?is)<title>([^<]+)</title>";

/// Immutable heuristic tables for one printer vendor.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    /// Display label, e.g. "Canon".
    vendor: String,
    /// Lower-case substrings; any hit classifies the text as this vendor.
    keywords: Vec<String>,
    /// Ordered model patterns; first match wins.
    model_patterns: Vec<Regex>,
    title: Regex,
}

impl VendorProfile {
    /// Build a profile from raw tables. Fails if any pattern does not compile.
    pub fn new(vendor: &str, keywords: &[&str], model_patterns: &[&str]) -> Result<Self> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| ScoutError::Config(format!("model pattern '{p}': {e}")))
        };
        Ok(Self {
            vendor: vendor.to_string(),
            keywords: keywords.iter().map(|k| k.to_ascii_lowercase()).collect(),
            model_patterns: model_patterns
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_>>()?,
            title: compile(TITLE_PATTERN)?,
        })
    }

    /// The built-in Canon tables.
    pub fn canon() -> Self {
        Self::new("Canon", CANON_KEYWORDS, CANON_MODEL_PATTERNS)
            .expect("built-in Canon patterns are valid regexes")
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }
}

impl Default for VendorProfile {
    fn default() -> Self {
        Self::canon()
    }
}

/// What a device banner told us about the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub name: String,
    pub model: String,
}

/// Applies a `VendorProfile` to banners and printer names.
#[derive(Debug, Clone, Default)]
pub struct DeviceClassifier {
    profile: VendorProfile,
}

impl DeviceClassifier {
    pub fn new(profile: VendorProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    /// Case-insensitive keyword test.
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.profile.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Normalise a printer name to `"<Vendor> <MODEL>"`, or the generic
    /// `"<Vendor> Printer"` when no pattern matches.
    pub fn extract_model(&self, name: &str) -> String {
        let upper = name.to_uppercase();
        for pattern in &self.profile.model_patterns {
            if let Some(caps) = pattern.captures(&upper) {
                let model = caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str());
                if let Some(model) = model {
                    return format!("{} {}", self.profile.vendor, model);
                }
            }
        }
        format!("{} Printer", self.profile.vendor)
    }

    /// First `<title>` in an HTML document, trimmed. A whitespace-only title
    /// is still a title and comes back empty.
    pub fn extract_title(&self, html: &str) -> Option<String> {
        self.profile
            .title
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Classify a banner served by `ip`. Returns `None` when no vendor keyword
    /// appears anywhere in the body.
    pub fn identify(&self, ip: IpAddr, body: &str) -> Option<Identification> {
        if !self.matches(body) {
            debug!(%ip, "banner has no vendor keyword");
            return None;
        }
        let name = self
            .extract_title(body)
            .unwrap_or_else(|| format!("{} Printer at {ip}", self.profile.vendor));
        let model = self.extract_model(&name);
        Some(Identification { name, model })
    }
}
