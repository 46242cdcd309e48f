// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printscout core: types, configuration and errors shared by the discovery
// engine and the application binary.

pub mod config;
pub mod error;
pub mod types;

pub use config::DiscoveryConfig;
pub use error::ScoutError;
pub use types::*;
