//! Error Types
//!
//! This module defines the error types used throughout the compositor.
//!
//! # Overview
//!
//! The main error type [`ClayError`] covers the fatal failure modes:
//! - Render graph authoring errors (duplicate names, cycles, missing terminal)
//! - Effect description parsing errors
//! - Use of a compositor after teardown
//!
//! Lookups of optional nodes never fail; they return `Option`. Unknown quality
//! tiers and unknown parameter names are not errors either: the former fall back
//! to a documented default, the latter are logged and ignored.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ClayError>`.
//!
//! ```rust,ignore
//! use clay::errors::{ClayError, Result};
//!
//! fn build() -> Result<()> {
//!     let description = EffectDescription::builtin()?;
//!     let graph = description.build()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the compositor.
#[derive(Error, Debug)]
pub enum ClayError {
    // ========================================================================
    // Render Graph Errors
    // ========================================================================
    /// A node with the same name is already registered in the graph.
    #[error("Duplicate render node name: {0}")]
    DuplicateName(String),

    /// The input bindings form a cycle; the named node is part of it.
    #[error("Render graph contains a cycle through node `{0}`")]
    CyclicGraph(String),

    /// No filter node renders to the caller-supplied target.
    #[error("Render graph has no terminal node")]
    MissingTerminal,

    // ========================================================================
    // Description & Configuration Errors
    // ========================================================================
    /// The effect description is structurally invalid.
    #[error("Effect description error: {0}")]
    Description(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A quality tier string did not match any known tier.
    ///
    /// Only returned by the strict [`FromStr`](std::str::FromStr) parser;
    /// the compositor itself falls back to the default tier.
    #[error("Unknown quality tier: {0}")]
    UnknownQuality(String),

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The compositor was used after its GPU resources were released.
    #[error("Compositor already disposed")]
    Disposed,
}

/// Alias for `Result<T, ClayError>`.
pub type Result<T> = std::result::Result<T, ClayError>;
