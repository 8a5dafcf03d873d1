//! Error types for prototype validation.
//!
//! Only *prototype author* mistakes are errors: malformed keys, wrong
//! literal types, undefined names, bad regex patterns, condition syntax
//! problems. Data that legitimately fails to match a prototype is not an
//! error; it is reported through [`Validation`](crate::Validation).

use thiserror::Error;

/// A defect in the prototype itself (or its wiring), aborting validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No mode key was present on a prototype node.
    #[error("'type', 'class' or 'custom' is required for each level in the prototype")]
    MissingMode,

    /// A prototype node (or fragment expected to be one) was not a struct.
    #[error("prototype node must be a struct, found {0}")]
    PrototypeNotStruct(String),

    /// The `type` tag did not name a known type.
    #[error("type '{0}' was not recognized")]
    UnrecognizedType(String),

    /// A `custom` reference to a type never registered.
    #[error("custom type '{0}' has not been defined")]
    UndefinedCustomType(String),

    /// A `defitem` reference to a default item never registered.
    #[error("default item '{0}' has not been registered")]
    UndefinedDefaultItem(String),

    /// A `normalize` reference to a hook never registered.
    #[error("normalizer '{0}' has not been registered")]
    UndefinedNormalizer(String),

    /// A normalize/denormalize hook invocation failed.
    #[error("normalizer '{name}' failed to {operation}: {source}")]
    Hook {
        /// Registered hook name.
        name: String,
        /// Which direction failed (`normalize` or `denormalize`).
        operation: &'static str,
        /// Underlying hook error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A prototype constraint value had the wrong shape.
    #[error("'{key}' must be {expected}")]
    BadConstraint {
        /// Prototype key that was malformed.
        key: String,
        /// What the key requires.
        expected: &'static str,
    },

    /// An empty `fields` or `definition` alternative list.
    #[error("'{0}' cannot be an empty list")]
    EmptyAlternatives(String),

    /// A malformed `regex` pattern, surfacing the pattern engine's message.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A malformed date format pattern supplied in the options.
    #[error("invalid date pattern '{0}'")]
    InvalidDatePattern(String),

    /// An `after`/`before` bound string that does not parse as a date.
    #[error("failed to parse prototype '{key}' value '{text}' as date of pattern '{pattern}'")]
    UnparseableDateBound {
        /// `after` or `before`.
        key: &'static str,
        /// The bound text from the prototype.
        text: String,
        /// Active date pattern.
        pattern: String,
    },

    /// A nested condition under a key that is neither `and` nor `or`.
    #[error(
        "condition '{0}' holds a struct; only an 'and' or 'or' key may hold nested conditions"
    )]
    BadConditionNesting(String),

    /// A comparator token that is not part of the condition grammar.
    #[error("unrecognized comparator '{comparator}' in dynamic condition '{key}'")]
    UnrecognizedComparator {
        /// The unknown token.
        comparator: String,
        /// The full condition key it came from.
        key: String,
    },

    /// A condition literal of a type the comparator cannot handle.
    #[error("dynamic condition '{key}' compares against a {found}; expected string, number, boolean or null")]
    BadConditionLiteral {
        /// Field name from the condition key.
        key: String,
        /// Type name of the offending literal.
        found: String,
    },

    /// An equality comparator over a type pairing it cannot handle.
    #[error("dynamic condition '{key}' cannot compare a {expected} literal with a {found} value")]
    ConditionTypeMismatch {
        /// Field name from the condition key.
        key: String,
        /// Type name of the prototype literal.
        expected: String,
        /// Type name of the data value (or "absent").
        found: String,
    },

    /// An ordering comparator with a non-numeric literal.
    #[error("dynamic condition '{0}' requires a numeric literal for 'gt', 'gte', 'lt' and 'lte'")]
    NonNumericConditionBound(String),

    /// An up-level prefix that walked past the root scope.
    #[error("dynamic condition for '{0}' went beyond the root scope")]
    ConditionBeyondRoot(String),

    /// A condition resolved to a scope whose value is not a struct.
    #[error("dynamic condition for '{key}' can only examine a struct, found {found}")]
    ConditionTargetNotStruct {
        /// Field name from the condition key.
        key: String,
        /// Type name of the resolved scope value.
        found: String,
    },
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
