// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printscout.
//
// Probing never surfaces these: a failed probe is simply absence. They cover
// the boundary operations (configuration, parsing, cache loading, manual add).

use thiserror::Error;

/// Top-level error type for all Printscout boundary operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid CIDR block '{0}'")]
    InvalidCidr(String),

    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    #[error("invalid printer URI '{0}'")]
    InvalidUri(String),

    #[error("cannot connect to {host}:{port}")]
    Unreachable { host: String, port: u16 },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;
