//! Engine construction options.

use serde::{Deserialize, Serialize};

/// Options consumed once, at [`Validator`](crate::Validator) construction.
///
/// All flags default to off, matching the most permissive behavior:
/// unspecified keys pass through verbatim and empty strings are kept.
///
/// # Examples
///
/// ```
/// use json_prototype_core::ValidatorOptions;
///
/// let options = ValidatorOptions {
///     error_on_unspecified_keys: true,
///     ..Default::default()
/// };
/// assert!(!options.remove_unspecified_keys);
/// assert_eq!(options.date_pattern, "%Y-%m-%d %H:%M:%S");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorOptions {
    /// Fail a struct when the data carries a key its field pattern never
    /// declares (and no wildcard consumes it).
    pub error_on_unspecified_keys: bool,
    /// Drop undeclared keys from the output instead of passing them
    /// through verbatim.
    pub remove_unspecified_keys: bool,
    /// Omit any field whose accepted value is a blank string (trimmed
    /// empty). Per-field `remove_empty` overrides this for one field.
    pub remove_keys_when_value_empty: bool,
    /// strftime pattern for parsing `date` values and bounds.
    pub date_pattern: String,
    /// Namespace prefixes a bare class-list entry also matches under
    /// (e.g. `Money` matching `std.Money`).
    pub implicit_namespaces: Vec<String>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            error_on_unspecified_keys: false,
            remove_unspecified_keys: false,
            remove_keys_when_value_empty: false,
            date_pattern: "%Y-%m-%d %H:%M:%S".to_string(),
            implicit_namespaces: vec!["std".to_string(), "core".to_string()],
        }
    }
}
