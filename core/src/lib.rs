//! Recursive validation of generic value trees against declarative
//! prototypes.
//!
//! A *prototype* is itself a [`Value`] tree describing what the data must
//! look like. Every prototype node carries one of three mode keys:
//!
//! - `class` — the value's class name must appear in a comma-separated
//!   allow-list (optionally combined with a `type` check and a
//!   normalize/denormalize hook pair).
//! - `type` — the value must satisfy a built-in type constraint
//!   (`string`, `number`, `boolean`, `simple`, `struct`, `array`, `date`,
//!   `null`, `any`) plus that type's refinements.
//! - `custom` — indirection to a registered, reusable type fragment.
//!
//! Struct prototypes declare per-field descriptors with requiredness and
//! suppression rules (booleans or condition structs evaluated against
//! the surrounding data), default injection, and
//! nested definitions. Both field patterns and field definitions may be
//! lists of alternatives tried in order with backtracking.
//!
//! [`Validator::validate`] keeps two failure channels apart: a defective
//! prototype is a [`SchemaError`]; data that legitimately fails to match
//! is a [`Validation::Invalid`] report.
//!
//! # Example
//!
//! ```
//! use json_prototype_core::{Validator, Value};
//! use serde_json::json;
//!
//! let validator = Validator::with_defaults();
//! let prototype = Value::from(json!({
//!     "type": "struct",
//!     "fields": {
//!         "kind": {
//!             "req": true,
//!             "definition": { "type": "string", "enum": ["card", "cash"] }
//!         },
//!         "card_number": {
//!             // Required only when the sibling field says so.
//!             "req": { "eq&kind": "card" },
//!             "definition": { "type": "string", "regex": "[0-9]{16}" }
//!         }
//!     }
//! }));
//!
//! let data = Value::from(json!({ "kind": "cash" }));
//! assert!(validator.validate(&data, &prototype).unwrap().is_valid());
//!
//! let data = Value::from(json!({ "kind": "card" }));
//! let outcome = validator.validate(&data, &prototype).unwrap();
//! assert_eq!(outcome.message(), Some(" required field card_number was not found"));
//! ```

mod condition;
pub mod datetime;
mod engine;
mod error;
mod options;
mod registry;
mod scope;
mod value;

pub use engine::{Validation, Validator, keys};
pub use error::{Result, SchemaError};
pub use options::ValidatorOptions;
pub use registry::{CustomTypes, DefaultItems, HookError, Normalizer, Normalizers};
pub use scope::ScopeNode;
pub use value::{OpaqueValue, StructMap, Value};
