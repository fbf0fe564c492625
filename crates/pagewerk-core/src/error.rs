// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewerk.

use thiserror::Error;

/// Top-level error type for all Pagewerk operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Vision engine --
    #[error("vision engine unavailable after {attempts} readiness checks")]
    EngineUnavailable { attempts: u32 },

    // -- Image data --
    #[error("image decoding failed: {0}")]
    DecodeFailure(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("degenerate quadrilateral: {0}")]
    GeometryDegenerate(String),

    #[error("output of {width}x{height} pixels exceeds the limit of {limit} pixels")]
    OutputTooLarge { width: u32, height: u32, limit: u64 },

    // -- Workspace --
    #[error("unknown workspace item: {0}")]
    UnknownItem(String),

    #[error("nothing to undo")]
    NothingToUndo,

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
