//! # Error Types
//!
//! Configuration and content problems are programmer errors: they surface as
//! [`ConfigError`] the moment a bad document is built and abort the level.
//! Subscription hygiene problems are only logged (see [`crate::message`]).

use thiserror::Error;

/// Errors raised while turning data (entity specs, config files) into live objects.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No builder is registered for the `type` tag of a component or behavior.
    #[error("no {kind} builder registered for type `{type_tag}`")]
    UnknownType {
        /// "component" or "behavior".
        kind: &'static str,
        /// The unknown tag.
        type_tag: String,
    },

    /// A required field is absent from a spec document.
    #[error("`{type_tag}` {kind} requires field `{field}`")]
    MissingField {
        /// "component", "behavior", "shape", ...
        kind: &'static str,
        /// Type tag of the document being built.
        type_tag: String,
        /// Name of the missing field.
        field: String,
    },

    /// A field is present but has the wrong type or an out-of-range value.
    #[error("`{type_tag}` field `{field}` is invalid: {reason}")]
    InvalidField {
        /// Type tag of the document being built.
        type_tag: String,
        /// Offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A collision shape tag the shape library does not know.
    #[error("unsupported shape type `{0}`")]
    UnsupportedShape(String),

    /// A behavior could not find a sibling it depends on at update-ready time.
    #[error("`{owner}`: required {kind} `{name}` is not attached to the owner")]
    MissingSibling {
        /// Name of the owning object.
        owner: String,
        /// Kind of the missing sibling ("collision component", ...).
        kind: &'static str,
        /// Name that was looked up.
        name: String,
    },

    /// The document is not valid JSON or does not match the entity-spec shape.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// A config file could not be read.
    #[error("cannot read `{path}`: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from the procedural map generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The grid cannot hold the requested points plus one start tile.
    #[error("{width}x{depth} grid cannot hold {points} points and a start tile")]
    TooSmall {
        /// Grid width.
        width: usize,
        /// Grid depth.
        depth: usize,
        /// Requested point count.
        points: usize,
    },
}

/// Anything that can stop the simulation loop.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Map(#[from] MapError),
}

/// Result alias for configuration work.
pub type ConfigResult<T> = Result<T, ConfigError>;
