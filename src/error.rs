//! Rich diagnostic error types for the spelunk agent.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. The split mirrors the failure taxonomy:
//! knowledge-base errors are fatal logic bugs, world errors are configuration
//! or I/O problems. Planner "no path" results are `Option::None`, never errors.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the spelunk agent.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SpelunkError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    World(#[from] WorldError),
}

// ---------------------------------------------------------------------------
// Knowledge-base errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error("cell ({row}, {col}) is outside the {size}x{size} grid")]
    #[diagnostic(
        code(spelunk::kb::out_of_bounds),
        help(
            "Hazard variables are only defined for cells inside the grid. \
             A coordinate outside [0, N)x[0, N) reaching the variable encoder \
             is an upstream bug, not a recoverable condition."
        )
    )]
    CellOutOfBounds { row: usize, col: usize, size: usize },

    #[error("attempted to add an empty clause to the knowledge base")]
    #[diagnostic(
        code(spelunk::kb::empty_clause),
        help(
            "An empty clause is unsatisfiable by definition and would poison \
             every future query. Check the clause-generation code path that \
             produced it."
        )
    )]
    EmptyClause,

    #[error("knowledge base is unsatisfiable with no assumptions ({clauses} clauses)")]
    #[diagnostic(
        code(spelunk::kb::contradiction),
        help(
            "The clause set contradicts itself, so every safety judgment from \
             here on would be vacuously true. This indicates a bug in clause \
             derivation (percept translation or a deduction pass), not a \
             legitimate agent state."
        )
    )]
    Contradiction { clauses: usize },
}

// ---------------------------------------------------------------------------
// World errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum WorldError {
    #[error("invalid world configuration: {message}")]
    #[diagnostic(
        code(spelunk::world::invalid_config),
        help(
            "A world needs room for every pit, one Wumpus, one gold, and a \
             hazard-free start cell. Reduce the pit count or enlarge the grid."
        )
    )]
    InvalidConfig { message: String },

    #[error("no winnable world found after {attempts} generation attempts")]
    #[diagnostic(
        code(spelunk::world::generation_failed),
        help(
            "Every sampled hazard placement blocked all safe paths from the \
             start to the gold. This only happens when hazards nearly fill the \
             grid; lower the pit count."
        )
    )]
    GenerationFailed { attempts: usize },

    #[error("I/O error: {source}")]
    #[diagnostic(
        code(spelunk::world::io),
        help("Check that the world file path exists and is readable/writable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("world serialization error: {message}")]
    #[diagnostic(
        code(spelunk::world::serde),
        help(
            "The world file could not be encoded or decoded. It may have been \
             written by an incompatible version; regenerate it with `spelunk generate`."
        )
    )]
    Serialization { message: String },
}

/// Convenience alias for functions returning spelunk results.
pub type SpelunkResult<T> = std::result::Result<T, SpelunkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_error_converts_to_spelunk_error() {
        let err = KbError::CellOutOfBounds {
            row: 9,
            col: 0,
            size: 8,
        };
        let top: SpelunkError = err.into();
        assert!(matches!(top, SpelunkError::Kb(KbError::CellOutOfBounds { .. })));
    }

    #[test]
    fn world_error_converts_to_spelunk_error() {
        let err = WorldError::InvalidConfig {
            message: "too many pits".into(),
        };
        let top: SpelunkError = err.into();
        assert!(matches!(top, SpelunkError::World(WorldError::InvalidConfig { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = KbError::CellOutOfBounds {
            row: 9,
            col: 2,
            size: 8,
        };
        let msg = format!("{err}");
        assert!(msg.contains("(9, 2)"));
        assert!(msg.contains("8x8"));
    }
}
