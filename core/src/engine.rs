//! The recursive validation engine.
//!
//! [`Validator::validate`] walks a prototype and a data tree in lock-step.
//! Each prototype node selects a mode — a `class` constraint, a `type`
//! constraint, or a `custom` alias — and each type handler enforces its
//! constraints while assembling a normalized copy of the accepted data.
//!
//! Data failures are ordinary [`Validation::Invalid`] outcomes carrying a
//! path-qualified message; they backtrack cleanly across struct
//! field-pattern alternatives. Prototype defects abort the whole call
//! with a [`SchemaError`].
//!
//! # Examples
//!
//! ```
//! use json_prototype_core::{Validator, Value};
//! use serde_json::json;
//!
//! let validator = Validator::with_defaults();
//! let prototype = Value::from(json!({ "type": "number", "min": 1, "max": 3 }));
//!
//! let ok = validator.validate(&Value::from(2.0), &prototype).unwrap();
//! assert_eq!(ok.into_value(), Some(Value::from(2.0)));
//!
//! let bad = validator.validate(&Value::from(5.0), &prototype).unwrap();
//! assert!(!bad.is_valid());
//! ```

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::condition;
use crate::datetime;
use crate::error::{Result, SchemaError};
use crate::options::ValidatorOptions;
use crate::registry::{CustomTypes, DefaultItems, Normalizer, Normalizers};
use crate::scope::ScopeNode;
use crate::value::{StructMap, Value};

/// Prototype key names (the wire format of the schema language).
pub mod keys {
    /// Selects type mode; value is a type tag.
    pub const TYPE: &str = "type";
    /// Selects class mode; value is a comma-separated class allow-list.
    pub const CLASS: &str = "class";
    /// Selects custom mode; value is a registered custom type name.
    pub const CUSTOM: &str = "custom";
    /// Class mode: name of a registered normalize/denormalize hook pair.
    pub const NORMALIZE: &str = "normalize";
    /// Class mode: boolean controlling the denormalize pass.
    pub const DENORMALIZE: &str = "denormalize";
    /// Field descriptor: literal default value.
    pub const DEFAULT: &str = "def";
    /// Field descriptor: named default item reference.
    pub const DEFAULT_ITEM: &str = "defitem";
    /// Field descriptor: requiredness (boolean or condition struct).
    pub const REQUIRED: &str = "req";
    /// Field descriptor: suppression (boolean or condition struct).
    pub const ERR_ON: &str = "err_on";
    /// Field descriptor: nested definition (struct or list of structs).
    pub const DEFINITION: &str = "definition";
    /// String type: allow-list of values.
    pub const ENUM: &str = "enum";
    /// String type: deny-list of values.
    pub const NOT_ENUM: &str = "not";
    /// String type: reject blank strings.
    pub const ERR_ON_EMPTY: &str = "err_on_empty";
    /// Definition block: omit the field when its value is a blank string.
    pub const REMOVE_EMPTY: &str = "remove_empty";
    /// String type: regex the value must fully match.
    pub const REGEX: &str = "regex";
    /// Struct type: field pattern (struct) or alternatives (list).
    pub const FIELDS: &str = "fields";
    /// Number/array types: inclusive lower bound.
    pub const MIN: &str = "min";
    /// Number/array types: inclusive upper bound.
    pub const MAX: &str = "max";
    /// Date type: exclusive lower bound.
    pub const AFTER: &str = "after";
    /// Date type: exclusive upper bound.
    pub const BEFORE: &str = "before";
    /// Array type: element prototype.
    pub const CHILDREN: &str = "children";
    /// Struct field pattern: wildcard governing undeclared fields.
    pub const WILDCARD: &str = "*";
}

/// Outcome of one validation call.
///
/// `Valid` carries the accepted, normalized output tree. `Invalid`
/// carries a single human-readable message combining the leaf reason
/// with a dotted/bracketed path trail.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// The data satisfied the prototype; holds the normalized output.
    Valid(Value),
    /// The data did not satisfy the prototype; holds the failure report.
    Invalid(String),
}

impl Validation {
    /// Whether the data was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    /// The normalized output, if accepted.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Validation::Valid(value) => Some(value),
            Validation::Invalid(_) => None,
        }
    }

    /// The failure report, if rejected.
    pub fn message(&self) -> Option<&str> {
        match self {
            Validation::Valid(_) => None,
            Validation::Invalid(message) => Some(message),
        }
    }
}

/// Validates generic value trees against declarative prototypes.
///
/// One instance can service any number of `validate` calls, including
/// concurrently: every call threads its own scope nodes and outcome, and
/// the registries are only read.
///
/// # Examples
///
/// ```
/// use json_prototype_core::{Validator, Value};
/// use serde_json::json;
///
/// let validator = Validator::with_defaults();
/// let prototype = Value::from(json!({
///     "type": "struct",
///     "fields": {
///         "name": { "req": true, "definition": { "type": "string" } }
///     }
/// }));
///
/// let outcome = validator
///     .validate(&Value::from(json!({ "name": "Ada" })), &prototype)
///     .unwrap();
/// assert!(outcome.is_valid());
/// ```
pub struct Validator {
    options: ValidatorOptions,
    default_items: DefaultItems,
    custom_types: CustomTypes,
    normalizers: Normalizers,
}

impl Validator {
    /// Creates a validator with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidDatePattern`] if the configured date
    /// pattern is malformed.
    pub fn new(options: ValidatorOptions) -> Result<Self> {
        if !datetime::pattern_is_valid(&options.date_pattern) {
            return Err(SchemaError::InvalidDatePattern(options.date_pattern));
        }
        Ok(Self {
            options,
            default_items: DefaultItems::default(),
            custom_types: CustomTypes::default(),
            normalizers: Normalizers::default(),
        })
    }

    /// Creates a validator with default options.
    pub fn with_defaults() -> Self {
        Self::new(ValidatorOptions::default()).expect("default options are valid")
    }

    /// The options this validator was constructed with.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Registers a named default item for `defitem` references.
    pub fn add_default_item(&mut self, name: impl Into<String>, item: Value) {
        self.default_items.add(name, item);
    }

    /// Registers many default items at once.
    pub fn add_default_items(&mut self, items: impl IntoIterator<Item = (String, Value)>) {
        self.default_items.add_all(items);
    }

    /// Snapshot of the registered default items.
    pub fn default_items(&self) -> HashMap<String, Value> {
        self.default_items.snapshot()
    }

    /// Registers a named custom type fragment for `custom` references.
    pub fn add_custom_type(&mut self, name: impl Into<String>, fragment: Value) {
        self.custom_types.add(name, fragment);
    }

    /// Registers many custom type fragments at once.
    pub fn add_custom_types(&mut self, types: impl IntoIterator<Item = (String, Value)>) {
        self.custom_types.add_all(types);
    }

    /// Snapshot of the registered custom types.
    pub fn custom_types(&self) -> HashMap<String, Value> {
        self.custom_types.snapshot()
    }

    /// Registers a normalize/denormalize hook pair for `normalize` references.
    pub fn add_normalizer(&mut self, name: impl Into<String>, normalizer: Box<dyn Normalizer>) {
        self.normalizers.add(name, normalizer);
    }

    /// Validates `data` against `prototype`.
    ///
    /// Returns `Ok(Validation::Valid(output))` with the normalized output
    /// tree when the data is accepted, `Ok(Validation::Invalid(report))`
    /// when the data legitimately fails, and `Err(SchemaError)` when the
    /// prototype itself is defective.
    pub fn validate(&self, data: &Value, prototype: &Value) -> Result<Validation> {
        let prototype = proto_struct(prototype)?;
        let scope = ScopeNode::root(data);
        self.validate_block(&scope, prototype)
    }

    /// Mode dispatch for one prototype node.
    fn validate_block(&self, scope: &ScopeNode<'_>, proto: &StructMap) -> Result<Validation> {
        if has(proto, keys::CLASS) {
            self.handle_class(scope, proto)
        } else if has(proto, keys::TYPE) {
            self.handle_type(scope, proto)
        } else if has(proto, keys::CUSTOM) {
            self.handle_custom(scope, proto)
        } else {
            Err(SchemaError::MissingMode)
        }
    }

    fn handle_class(&self, scope: &ScopeNode<'_>, proto: &StructMap) -> Result<Validation> {
        let expected = string_constraint(proto, keys::CLASS, "a string of class names")?
            .ok_or(SchemaError::BadConstraint {
                key: keys::CLASS.to_string(),
                expected: "a string of class names",
            })?;
        let found = scope.value.type_name();

        let matched = expected
            .split(',')
            .map(str::trim)
            .any(|entry| self.class_matches(entry, found));
        if !matched {
            return Ok(Validation::Invalid(format!(
                " expected class ({expected}) found class ({found})"
            )));
        }

        if !has(proto, keys::TYPE) {
            return Ok(Validation::Valid(scope.value.clone()));
        }

        // Normalize before type-checking, if a hook is named.
        let hook_name = string_constraint(proto, keys::NORMALIZE, "a string hook name")?;
        let hook = hook_name
            .map(|name| {
                self.normalizers
                    .get(name)
                    .ok_or_else(|| SchemaError::UndefinedNormalizer(name.to_string()))
                    .map(|hook| (name, hook))
            })
            .transpose()?;
        let normalized = hook
            .map(|(name, hook)| {
                hook.normalize(scope.value).map_err(|source| SchemaError::Hook {
                    name: name.to_string(),
                    operation: "normalize",
                    source,
                })
            })
            .transpose()?;

        // The (possibly normalized) value replaces the current scope at
        // the same level, so conditions still see the original ancestors.
        let subject = normalized.as_ref().unwrap_or(scope.value);
        let subject_scope = ScopeNode {
            value: subject,
            parent: scope.parent,
        };
        let accepted = match self.handle_type(&subject_scope, proto)? {
            Validation::Invalid(message) => return Ok(Validation::Invalid(message)),
            Validation::Valid(output) => output,
        };

        let denormalize = bool_constraint(proto, keys::DENORMALIZE)?;
        if let Some((name, hook)) = hook {
            if denormalize != Some(false) {
                let restored =
                    hook.denormalize(&accepted).map_err(|source| SchemaError::Hook {
                        name: name.to_string(),
                        operation: "denormalize",
                        source,
                    })?;
                return Ok(Validation::Valid(restored));
            }
        }
        Ok(Validation::Valid(accepted))
    }

    /// A bare (unqualified) allow-list entry also matches under the
    /// configured implicit namespaces.
    fn class_matches(&self, expected: &str, found: &str) -> bool {
        if expected == found {
            return true;
        }
        !expected.contains('.')
            && self
                .options
                .implicit_namespaces
                .iter()
                .any(|ns| found == format!("{ns}.{expected}"))
    }

    fn handle_custom(&self, scope: &ScopeNode<'_>, proto: &StructMap) -> Result<Validation> {
        let name = string_constraint(proto, keys::CUSTOM, "a string type name")?
            .ok_or(SchemaError::BadConstraint {
                key: keys::CUSTOM.to_string(),
                expected: "a string type name",
            })?;
        let fragment = self
            .custom_types
            .get(name)
            .ok_or_else(|| SchemaError::UndefinedCustomType(name.to_string()))?;
        self.handle_type(scope, proto_struct(fragment)?)
    }

    fn handle_type(&self, scope: &ScopeNode<'_>, proto: &StructMap) -> Result<Validation> {
        let tag = string_constraint(proto, keys::TYPE, "a string type tag")?
            .ok_or(SchemaError::BadConstraint {
                key: keys::TYPE.to_string(),
                expected: "a string type tag",
            })?;
        debug!(type_tag = %tag, depth = scope.depth(), "type check");
        match tag.to_ascii_lowercase().as_str() {
            "string" => self.check_string(scope.value, proto),
            "number" | "numeric" => self.check_number(scope.value, proto),
            "boolean" | "bool" => check_boolean(scope.value),
            "simple" => check_simple(scope.value),
            "struct" => self.check_struct(scope, proto),
            "array" | "list" => self.check_array(scope, proto),
            "date" => self.check_date(scope.value, proto),
            "null" => check_null(scope.value),
            "any" => Ok(Validation::Valid(scope.value.clone())),
            _ => Err(SchemaError::UnrecognizedType(tag.to_string())),
        }
    }

    fn check_string(&self, value: &Value, proto: &StructMap) -> Result<Validation> {
        let enum_values = list_constraint(proto, keys::ENUM)?;
        let not_values = list_constraint(proto, keys::NOT_ENUM)?;

        if value.is_null() {
            return Ok(null_disallowed());
        }
        let Value::String(text) = value else {
            return Ok(type_mismatch("string", value));
        };

        if bool_constraint(proto, keys::ERR_ON_EMPTY)?.unwrap_or(false) && text.trim().is_empty()
        {
            return Ok(Validation::Invalid(
                " empty string was found but not allowed".to_string(),
            ));
        }

        if let Some(allowed) = enum_values {
            if !allowed.contains(value) {
                return Ok(Validation::Invalid(format!(
                    " item {text} was not found in {} list",
                    keys::ENUM
                )));
            }
        }
        if let Some(denied) = not_values {
            if denied.contains(value) {
                return Ok(Validation::Invalid(format!(
                    " item {text} was found in {} list",
                    keys::NOT_ENUM
                )));
            }
        }

        if let Some(pattern) = string_constraint(proto, keys::REGEX, "a string pattern")? {
            // Anchored: the whole string must match, not a substring.
            let regex = Regex::new(&format!("^(?:{pattern})$"))?;
            if !regex.is_match(text) {
                return Ok(Validation::Invalid(format!(
                    " string '{text}' did not match regex pattern {pattern}"
                )));
            }
        }

        Ok(Validation::Valid(value.clone()))
    }

    fn check_number(&self, value: &Value, proto: &StructMap) -> Result<Validation> {
        if value.is_null() {
            return Ok(null_disallowed());
        }
        let Value::Number(actual) = value else {
            return Ok(type_mismatch("number", value));
        };

        if let Some(min) = number_constraint(proto, keys::MIN)? {
            if *actual < min {
                return Ok(Validation::Invalid(format!(
                    " expected number to be greater than or equal to {min} but was {actual}"
                )));
            }
        }
        if let Some(max) = number_constraint(proto, keys::MAX)? {
            if *actual > max {
                return Ok(Validation::Invalid(format!(
                    " expected number to be less than or equal to {max} but was {actual}"
                )));
            }
        }

        Ok(Validation::Valid(value.clone()))
    }

    fn check_date(&self, value: &Value, proto: &StructMap) -> Result<Validation> {
        if value.is_null() {
            return Ok(null_disallowed());
        }
        let pattern = &self.options.date_pattern;
        let date = match value {
            Value::Date(date) => *date,
            Value::String(text) => match datetime::parse_date(text, pattern) {
                Some(date) => date,
                None => {
                    return Ok(Validation::Invalid(format!(
                        " failed to parse string '{text}' as date of pattern ({pattern})"
                    )));
                }
            },
            other => return Ok(type_mismatch("date or string", other)),
        };

        if let Some(after) = self.date_bound(proto, keys::AFTER)? {
            if date <= after {
                return Ok(Validation::Invalid(format!(
                    " expected date to be after {} but was {}",
                    after.format(pattern),
                    date.format(pattern)
                )));
            }
        }
        if let Some(before) = self.date_bound(proto, keys::BEFORE)? {
            if date >= before {
                return Ok(Validation::Invalid(format!(
                    " expected date to be before {} but was {}",
                    before.format(pattern),
                    date.format(pattern)
                )));
            }
        }

        // Accepted dates pass through verbatim (a string stays a string).
        Ok(Validation::Valid(value.clone()))
    }

    /// Reads an `after`/`before` bound: a native date, or a string parsed
    /// with the configured pattern. An unparseable string is a prototype
    /// defect, unlike unparseable data.
    fn date_bound(
        &self,
        proto: &StructMap,
        key: &'static str,
    ) -> Result<Option<chrono::NaiveDateTime>> {
        match proto.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Date(date)) => Ok(Some(*date)),
            Some(Value::String(text)) => datetime::parse_date(text, &self.options.date_pattern)
                .map(Some)
                .ok_or_else(|| SchemaError::UnparseableDateBound {
                    key,
                    text: text.clone(),
                    pattern: self.options.date_pattern.clone(),
                }),
            Some(_) => Err(SchemaError::BadConstraint {
                key: key.to_string(),
                expected: "a date or date string",
            }),
        }
    }

    fn check_array(&self, scope: &ScopeNode<'_>, proto: &StructMap) -> Result<Validation> {
        if scope.value.is_null() {
            return Ok(null_disallowed());
        }
        let Value::Array(items) = scope.value else {
            return Ok(type_mismatch("array", scope.value));
        };

        if let Some(min) = integer_constraint(proto, keys::MIN)? {
            if items.len() < min {
                return Ok(Validation::Invalid(format!(
                    " min array length {min} actual {}",
                    items.len()
                )));
            }
        }
        if let Some(max) = integer_constraint(proto, keys::MAX)? {
            if items.len() > max {
                return Ok(Validation::Invalid(format!(
                    " max array length {max} actual {}",
                    items.len()
                )));
            }
        }

        let children = match proto.get(keys::CHILDREN) {
            Some(Value::Struct(children)) => children,
            _ => {
                return Err(SchemaError::BadConstraint {
                    key: keys::CHILDREN.to_string(),
                    expected: "a struct prototype node (required for type 'array')",
                });
            }
        };

        let mut output = Vec::with_capacity(items.len());
        for (index, element) in items.iter().enumerate() {
            let child = scope.child(element);
            match self.validate_block(&child, children)? {
                Validation::Valid(accepted) => output.push(accepted),
                Validation::Invalid(message) => {
                    // Fail fast; later elements are never examined.
                    return Ok(Validation::Invalid(format!("[{index}]{message}")));
                }
            }
        }
        Ok(Validation::Valid(Value::Array(output)))
    }

    fn check_struct(&self, scope: &ScopeNode<'_>, proto: &StructMap) -> Result<Validation> {
        if scope.value.is_null() {
            return Ok(null_disallowed());
        }
        let Value::Struct(data) = scope.value else {
            return Ok(type_mismatch("struct", scope.value));
        };

        let patterns = match proto.get(keys::FIELDS) {
            // No field pattern: the mapping passes unmodified.
            None | Some(Value::Null) => return Ok(Validation::Valid(scope.value.clone())),
            Some(Value::Struct(pattern)) => {
                return self.apply_field_pattern(scope, data, pattern);
            }
            Some(Value::Array(patterns)) => patterns,
            Some(_) => {
                return Err(SchemaError::BadConstraint {
                    key: keys::FIELDS.to_string(),
                    expected: "a struct or a list of structs",
                });
            }
        };
        if patterns.is_empty() {
            return Err(SchemaError::EmptyAlternatives(keys::FIELDS.to_string()));
        }

        debug!(alternatives = patterns.len(), depth = scope.depth(), "trying field patterns");
        let mut failures = Vec::with_capacity(patterns.len());
        for alternative in patterns {
            let Value::Struct(pattern) = alternative else {
                return Err(SchemaError::BadConstraint {
                    key: keys::FIELDS.to_string(),
                    expected: "a struct or a list of structs",
                });
            };
            match self.apply_field_pattern(scope, data, pattern)? {
                valid @ Validation::Valid(_) => return Ok(valid),
                Validation::Invalid(message) => failures.push(message),
            }
        }
        Ok(Validation::Invalid(aggregate_failures(
            " none of the possible field patterns validated, nested failures:",
            &failures,
            scope.depth(),
        )))
    }

    /// Evaluates one field-pattern mapping against the current struct.
    fn apply_field_pattern(
        &self,
        scope: &ScopeNode<'_>,
        data: &StructMap,
        pattern: &StructMap,
    ) -> Result<Validation> {
        let mut output = StructMap::new();

        for (field, descriptor) in pattern {
            if field == keys::WILDCARD {
                continue;
            }
            let descriptor = descriptor.as_struct().ok_or_else(|| {
                SchemaError::BadConstraint {
                    key: field.clone(),
                    expected: "a struct field descriptor",
                }
            })?;

            let required = self.bool_or_condition(descriptor, keys::REQUIRED, scope)?;
            let suppressed = self.bool_or_condition(descriptor, keys::ERR_ON, scope)?;

            match data.get(field) {
                None if required => {
                    return Ok(Validation::Invalid(format!(
                        " required field {field} was not found"
                    )));
                }
                Some(_) if suppressed => {
                    return Ok(Validation::Invalid(format!(
                        " field {field} was found but is not allowed"
                    )));
                }
                None => {
                    if let Some(default) = descriptor.get(keys::DEFAULT) {
                        output.insert(field.clone(), default.clone());
                    } else if descriptor.contains_key(keys::DEFAULT_ITEM) {
                        let item = self.resolve_default_item(descriptor)?;
                        output.insert(field.clone(), item);
                    }
                }
                Some(field_value) => {
                    let definition = descriptor.get(keys::DEFINITION);
                    if let Some(message) =
                        self.apply_field_definition(scope, field, field_value, definition, &mut output)?
                    {
                        return Ok(Validation::Invalid(message));
                    }
                }
            }
        }

        if let Some(wildcard) = pattern.get(keys::WILDCARD) {
            let wildcard = wildcard.as_struct().ok_or_else(|| SchemaError::BadConstraint {
                key: keys::WILDCARD.to_string(),
                expected: "a struct field descriptor",
            })?;
            let definition = wildcard.get(keys::DEFINITION);
            for (field, field_value) in data {
                if pattern.contains_key(field) {
                    continue;
                }
                if let Some(message) =
                    self.apply_field_definition(scope, field, field_value, definition, &mut output)?
                {
                    return Ok(Validation::Invalid(message));
                }
            }
        } else if self.options.error_on_unspecified_keys {
            for field in data.keys() {
                if !pattern.contains_key(field) {
                    return Ok(Validation::Invalid(format!(
                        " unexpected field '{field}' was found"
                    )));
                }
            }
        } else if !self.options.remove_unspecified_keys {
            // Pass undeclared fields through verbatim.
            for (field, field_value) in data {
                if pattern.contains_key(field) {
                    continue;
                }
                if self.options.remove_keys_when_value_empty && is_blank_string(field_value) {
                    continue;
                }
                output.insert(field.clone(), field_value.clone());
            }
        }

        Ok(Validation::Valid(Value::Struct(output)))
    }

    fn resolve_default_item(&self, descriptor: &StructMap) -> Result<Value> {
        let name = match descriptor.get(keys::DEFAULT_ITEM) {
            Some(Value::String(name)) => name,
            _ => {
                return Err(SchemaError::BadConstraint {
                    key: keys::DEFAULT_ITEM.to_string(),
                    expected: "a non-null item name",
                });
            }
        };
        self.default_items
            .resolve(name)
            .ok_or_else(|| SchemaError::UndefinedDefaultItem(name.clone()))
    }

    /// A field's `definition` is a single prototype node or a non-empty
    /// ordered list of alternatives; the first that validates wins.
    ///
    /// Returns `Ok(None)` on acceptance (the output map is updated) or
    /// `Ok(Some(message))` on a data failure.
    fn apply_field_definition(
        &self,
        scope: &ScopeNode<'_>,
        field: &str,
        field_value: &Value,
        definition: Option<&Value>,
        output: &mut StructMap,
    ) -> Result<Option<String>> {
        let alternatives = match definition {
            Some(Value::Struct(single)) => {
                return self.validate_field(scope, field, field_value, single, output);
            }
            Some(Value::Array(alternatives)) => alternatives,
            _ => {
                return Err(SchemaError::BadConstraint {
                    key: keys::DEFINITION.to_string(),
                    expected: "a struct or a non-empty list of structs (required for each field)",
                });
            }
        };
        if alternatives.is_empty() {
            return Err(SchemaError::EmptyAlternatives(keys::DEFINITION.to_string()));
        }

        let mut failures = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let Value::Struct(definition) = alternative else {
                return Err(SchemaError::BadConstraint {
                    key: keys::DEFINITION.to_string(),
                    expected: "a struct or a non-empty list of structs (required for each field)",
                });
            };
            match self.validate_field(scope, field, field_value, definition, output)? {
                None => return Ok(None),
                Some(message) => failures.push(message),
            }
        }
        Ok(Some(aggregate_failures(
            " none of the possible field definitions validated, nested failures:",
            &failures,
            scope.depth(),
        )))
    }

    /// Validates one present field against one definition block and, on
    /// acceptance, stores the output (unless the empty-value policy says
    /// to drop it).
    fn validate_field(
        &self,
        scope: &ScopeNode<'_>,
        field: &str,
        field_value: &Value,
        definition: &StructMap,
        output: &mut StructMap,
    ) -> Result<Option<String>> {
        let child = scope.child(field_value);
        match self.validate_block(&child, definition)? {
            Validation::Invalid(message) => Ok(Some(format!(".{field}{message}"))),
            Validation::Valid(accepted) => {
                let remove_empty = bool_constraint(definition, keys::REMOVE_EMPTY)?
                    .unwrap_or(self.options.remove_keys_when_value_empty);
                if !(remove_empty && is_blank_string(&accepted)) {
                    output.insert(field.to_string(), accepted);
                }
                Ok(None)
            }
        }
    }

    /// Reads a `req`/`err_on` spec: boolean literal or condition struct.
    fn bool_or_condition(
        &self,
        descriptor: &StructMap,
        key: &'static str,
        scope: &ScopeNode<'_>,
    ) -> Result<bool> {
        match descriptor.get(key) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(Value::Struct(condition)) => condition::evaluate(condition, scope),
            Some(_) => Err(SchemaError::BadConstraint {
                key: key.to_string(),
                expected: "a boolean or a condition struct",
            }),
        }
    }
}

/// Synthesizes a multi-line backtracking report, one line per failed
/// alternative, indented proportionally to scope depth.
fn aggregate_failures(header: &str, failures: &[String], depth: usize) -> String {
    let indent = "-".repeat(depth);
    let mut report = header.to_string();
    for failure in failures {
        report.push('\n');
        report.push_str(&indent);
        report.push_str(failure);
    }
    report
}

fn check_boolean(value: &Value) -> Result<Validation> {
    if value.is_null() {
        return Ok(null_disallowed());
    }
    match value {
        Value::Bool(_) => Ok(Validation::Valid(value.clone())),
        other => Ok(type_mismatch("boolean", other)),
    }
}

fn check_simple(value: &Value) -> Result<Validation> {
    if value.is_null() {
        return Ok(null_disallowed());
    }
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            Ok(Validation::Valid(value.clone()))
        }
        other => Ok(type_mismatch("simple (string|number|boolean)", other)),
    }
}

fn check_null(value: &Value) -> Result<Validation> {
    if value.is_null() {
        Ok(Validation::Valid(Value::Null))
    } else {
        Ok(Validation::Invalid(format!(
            " expected null value found type {}",
            value.type_name()
        )))
    }
}

fn null_disallowed() -> Validation {
    Validation::Invalid(" null value disallowed".to_string())
}

fn type_mismatch(expected: &str, found: &Value) -> Validation {
    Validation::Invalid(format!(
        " expected type {expected} found type {}",
        found.type_name()
    ))
}

/// A key counts as present only with a non-null value, so `{"class": null}`
/// falls through to the next mode.
fn has(proto: &StructMap, key: &str) -> bool {
    proto.get(key).is_some_and(|value| !value.is_null())
}

fn proto_struct(value: &Value) -> Result<&StructMap> {
    value
        .as_struct()
        .ok_or_else(|| SchemaError::PrototypeNotStruct(value.type_name().to_string()))
}

fn string_constraint<'a>(
    proto: &'a StructMap,
    key: &str,
    expected: &'static str,
) -> Result<Option<&'a str>> {
    match proto.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(SchemaError::BadConstraint {
            key: key.to_string(),
            expected,
        }),
    }
}

fn bool_constraint(proto: &StructMap, key: &str) -> Result<Option<bool>> {
    match proto.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(SchemaError::BadConstraint {
            key: key.to_string(),
            expected: "a boolean",
        }),
    }
}

fn number_constraint(proto: &StructMap, key: &str) -> Result<Option<f64>> {
    match proto.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(bound)) => Ok(Some(*bound)),
        Some(_) => Err(SchemaError::BadConstraint {
            key: key.to_string(),
            expected: "a number",
        }),
    }
}

fn integer_constraint(proto: &StructMap, key: &str) -> Result<Option<usize>> {
    match proto.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(bound)) if bound.fract() == 0.0 && *bound >= 0.0 => {
            Ok(Some(*bound as usize))
        }
        Some(_) => Err(SchemaError::BadConstraint {
            key: key.to_string(),
            expected: "an integer",
        }),
    }
}

fn list_constraint<'a>(proto: &'a StructMap, key: &str) -> Result<Option<&'a [Value]>> {
    match proto.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(SchemaError::BadConstraint {
            key: key.to_string(),
            expected: "a list",
        }),
    }
}

fn is_blank_string(value: &Value) -> bool {
    matches!(value, Value::String(text) if text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_missing_mode_is_schema_error() {
        let validator = Validator::with_defaults();
        let err = validator
            .validate(&v(json!(1)), &v(json!({ "min": 1 })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingMode));
    }

    #[test]
    fn test_null_mode_key_falls_through() {
        let validator = Validator::with_defaults();
        let proto = v(json!({ "class": null, "type": "number" }));
        assert!(validator.validate(&v(json!(2)), &proto).unwrap().is_valid());
    }

    #[test]
    fn test_unrecognized_type_tag() {
        let validator = Validator::with_defaults();
        let err = validator
            .validate(&v(json!(1)), &v(json!({ "type": "decimal" })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnrecognizedType(tag) if tag == "decimal"));
    }

    #[test]
    fn test_type_tags_are_case_insensitive_with_aliases() {
        let validator = Validator::with_defaults();
        for (tag, data) in [
            ("STRING", json!("x")),
            ("Numeric", json!(1)),
            ("bool", json!(true)),
            ("LIST", json!([])),
        ] {
            let mut proto = json!({ "type": tag });
            if tag == "LIST" {
                proto["children"] = json!({ "type": "any" });
            }
            let outcome = validator.validate(&v(data), &v(proto)).unwrap();
            assert!(outcome.is_valid(), "tag {tag} should validate");
        }
    }

    #[test]
    fn test_bad_bound_types_are_schema_errors() {
        let validator = Validator::with_defaults();
        let err = validator
            .validate(&v(json!(1)), &v(json!({ "type": "number", "min": "one" })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::BadConstraint { key, .. } if key == "min"));

        let err = validator
            .validate(
                &v(json!([1])),
                &v(json!({ "type": "array", "max": 1.5, "children": { "type": "any" } })),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::BadConstraint { key, .. } if key == "max"));
    }

    #[test]
    fn test_class_mode_with_implicit_namespaces() {
        let validator = Validator::with_defaults();
        let proto = v(json!({ "class": "string, number" }));
        assert!(validator.validate(&v(json!("x")), &proto).unwrap().is_valid());
        assert!(validator.validate(&v(json!(1)), &proto).unwrap().is_valid());
        assert!(!validator.validate(&v(json!(true)), &proto).unwrap().is_valid());

        // A bare entry matches the same name under std./core. prefixes.
        let opaque = Value::from(crate::value::OpaqueValue::new("std.Duration", Value::Null));
        let proto = v(json!({ "class": "Duration" }));
        assert!(validator.validate(&opaque, &proto).unwrap().is_valid());
    }

    #[test]
    fn test_class_mode_null_value_reports_null_class() {
        let validator = Validator::with_defaults();
        let proto = v(json!({ "class": "null" }));
        assert!(validator.validate(&Value::Null, &proto).unwrap().is_valid());

        let failure = validator
            .validate(&Value::Null, &v(json!({ "class": "string" })))
            .unwrap();
        assert!(failure.message().unwrap().contains("found class (null)"));
    }

    #[test]
    fn test_struct_without_fields_passes_unmodified() {
        let validator = Validator::with_defaults();
        let data = v(json!({ "a": 1, "b": [true] }));
        let outcome = validator
            .validate(&data, &v(json!({ "type": "struct" })))
            .unwrap();
        assert_eq!(outcome.into_value(), Some(data));
    }

    #[test]
    fn test_regex_is_anchored_and_bad_pattern_is_schema_error() {
        let validator = Validator::with_defaults();
        let proto = v(json!({ "type": "string", "regex": "[0-9]{3}" }));
        assert!(validator.validate(&v(json!("123")), &proto).unwrap().is_valid());
        // Substring matches are not enough.
        assert!(!validator.validate(&v(json!("x123")), &proto).unwrap().is_valid());

        let err = validator
            .validate(&v(json!("x")), &v(json!({ "type": "string", "regex": "(" })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRegex(_)));
    }
}
