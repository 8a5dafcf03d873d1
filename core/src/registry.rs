//! Embedder-supplied lookup tables consulted read-only during validation.
//!
//! Three registries hang off the [`Validator`](crate::Validator): named
//! default items (`defitem`), named custom type fragments (`custom`), and
//! named normalize/denormalize hook pairs (`normalize`). The embedder
//! populates them before validating; the engine only reads them.

use std::collections::HashMap;

use chrono::Local;

use crate::value::Value;

/// Error type normalize/denormalize hooks may return.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A pair of inverse conversions between an opaque value's shape and a
/// plain [`Value`] tree.
///
/// Class-mode prototypes name a registered normalizer; the engine runs
/// `normalize` before type-checking and, when the prototype asks for it,
/// `denormalize` on the accepted output. A hook failure aborts the whole
/// validation as a prototype wiring problem.
pub trait Normalizer: Send + Sync {
    /// Converts the raw value into the shape the `type` constraint checks.
    fn normalize(&self, value: &Value) -> Result<Value, HookError>;

    /// Converts the accepted, normalized output back.
    fn denormalize(&self, value: &Value) -> Result<Value, HookError>;
}

/// Named default values injected for absent optional fields (`defitem`).
///
/// The name `now` is reserved: it always resolves to the current
/// timestamp unless the embedder registered something under it.
#[derive(Default)]
pub struct DefaultItems {
    items: HashMap<String, Value>,
}

impl DefaultItems {
    /// Registers one default item.
    pub fn add(&mut self, name: impl Into<String>, item: Value) {
        self.items.insert(name.into(), item);
    }

    /// Registers many default items at once.
    pub fn add_all(&mut self, items: impl IntoIterator<Item = (String, Value)>) {
        self.items.extend(items);
    }

    /// Whether `name` resolves, counting the reserved `now`.
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name) || name.eq_ignore_ascii_case("now")
    }

    /// Resolves `name` to a value; `now` materializes a fresh timestamp.
    pub fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(item) = self.items.get(name) {
            return Some(item.clone());
        }
        if name.eq_ignore_ascii_case("now") {
            return Some(Value::Date(Local::now().naive_local()));
        }
        None
    }

    /// Snapshot of the registered items (without the implicit `now`).
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.items.clone()
    }
}

/// Named prototype fragments referenced by `custom` nodes.
#[derive(Default)]
pub struct CustomTypes {
    types: HashMap<String, Value>,
}

impl CustomTypes {
    /// Registers one custom type fragment (a type-constrained prototype node).
    pub fn add(&mut self, name: impl Into<String>, fragment: Value) {
        self.types.insert(name.into(), fragment);
    }

    /// Registers many fragments at once.
    pub fn add_all(&mut self, types: impl IntoIterator<Item = (String, Value)>) {
        self.types.extend(types);
    }

    /// Looks up a fragment by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.types.get(name)
    }

    /// Snapshot of the registered fragments.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.types.clone()
    }
}

/// Named [`Normalizer`] hook pairs referenced by `normalize` nodes.
#[derive(Default)]
pub struct Normalizers {
    hooks: HashMap<String, Box<dyn Normalizer>>,
}

impl Normalizers {
    /// Registers a hook pair under `name`.
    pub fn add(&mut self, name: impl Into<String>, normalizer: Box<dyn Normalizer>) {
        self.hooks.insert(name.into(), normalizer);
    }

    /// Looks up a hook pair by name.
    pub fn get(&self, name: &str) -> Option<&dyn Normalizer> {
        self.hooks.get(name).map(Box::as_ref)
    }
}

impl std::fmt::Debug for Normalizers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizers")
            .field("names", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
