//! Evaluator for the small boolean expressions embedded in prototypes.
//!
//! Field requiredness (`req`) and suppression (`err_on`) specs may be
//! condition mappings instead of boolean literals. A condition mapping
//! combines *dynamic conditions* — keys of the form
//! `[comparator]['^' × N]'&'field` comparing a field's runtime value
//! against a literal — under short-circuiting `and`/`or` connectives.
//!
//! The `^` prefix walks up enclosing scopes: `lt^&limit` compares against
//! `limit` in the parent struct, `eq^^&kind` against `kind` two levels up.
//!
//! A bare mapping evaluates as an `or`.

use crate::error::{Result, SchemaError};
use crate::scope::ScopeNode;
use crate::value::{StructMap, Value};

/// How sub-conditions of one mapping combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    Or,
    And,
}

impl Connective {
    /// The identity to start folding from; also the short-circuit guard:
    /// evaluation stops as soon as the running value flips away from it.
    fn start(self) -> bool {
        match self {
            Connective::Or => false,
            Connective::And => true,
        }
    }
}

/// Comparator tokens recognized in dynamic condition keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparator {
    /// Case-insensitive equality (the default).
    Eqi,
    /// Negated case-insensitive equality.
    Neqi,
    /// Case-sensitive equality.
    Eq,
    /// Negated case-sensitive equality.
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Field is present (literal ignored).
    Ex,
    /// Field is absent (literal ignored).
    Nex,
}

impl Comparator {
    fn parse(token: &str, key: &str) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eqi" => Ok(Comparator::Eqi),
            "neqi" => Ok(Comparator::Neqi),
            "eq" => Ok(Comparator::Eq),
            "neq" => Ok(Comparator::Neq),
            "gt" => Ok(Comparator::Gt),
            "gte" => Ok(Comparator::Gte),
            "lt" => Ok(Comparator::Lt),
            "lte" => Ok(Comparator::Lte),
            "ex" => Ok(Comparator::Ex),
            "nex" => Ok(Comparator::Nex),
            _ => Err(SchemaError::UnrecognizedComparator {
                comparator: token.to_string(),
                key: key.to_string(),
            }),
        }
    }
}

/// A parsed dynamic condition key.
#[derive(Debug, PartialEq, Eq)]
struct DynamicKey<'a> {
    comparator: &'a str,
    up_levels: usize,
    field: &'a str,
}

/// Splits `[comparator]['^' × N]'&'field` into its parts.
///
/// An absent selector (or absent `&` entirely) defaults the comparator to
/// `eqi` with no up-levels; a selector that is only carets keeps the
/// default comparator but still walks up.
fn parse_key(key: &str) -> DynamicKey<'_> {
    let Some(amp) = key.find('&') else {
        return DynamicKey {
            comparator: "eqi",
            up_levels: 0,
            field: key,
        };
    };
    let (selector, field) = (&key[..amp], &key[amp + 1..]);
    match selector.find('^') {
        None if selector.is_empty() => DynamicKey {
            comparator: "eqi",
            up_levels: 0,
            field,
        },
        None => DynamicKey {
            comparator: selector,
            up_levels: 0,
            field,
        },
        Some(caret) => DynamicKey {
            comparator: if caret == 0 { "eqi" } else { &selector[..caret] },
            up_levels: selector[caret..].chars().filter(|c| *c == '^').count(),
            field,
        },
    }
}

/// Evaluates a condition mapping against the current scope.
///
/// The top level combines as an `or`. Fails with [`SchemaError`] on
/// malformed conditions; never on data.
pub(crate) fn evaluate(condition: &StructMap, scope: &ScopeNode<'_>) -> Result<bool> {
    evaluate_with(condition, scope, Connective::Or)
}

fn evaluate_with(
    condition: &StructMap,
    scope: &ScopeNode<'_>,
    connective: Connective,
) -> Result<bool> {
    let start = connective.start();
    let mut result = start;

    for (key, literal) in condition {
        // Short-circuit: or stops at the first true, and at the first false.
        if result != start {
            break;
        }
        result = if let Value::Struct(nested) = literal {
            let lowered = key.to_ascii_lowercase();
            if lowered.starts_with("and") {
                evaluate_with(nested, scope, Connective::And)?
            } else if lowered.starts_with("or") {
                evaluate_with(nested, scope, Connective::Or)?
            } else {
                return Err(SchemaError::BadConditionNesting(key.clone()));
            }
        } else {
            evaluate_dynamic(key, literal, scope)?
        };
    }
    Ok(result)
}

fn evaluate_dynamic(key: &str, literal: &Value, scope: &ScopeNode<'_>) -> Result<bool> {
    let parsed = parse_key(key);
    let comparator = Comparator::parse(parsed.comparator, key)?;

    let target = scope
        .ancestor(parsed.up_levels)
        .ok_or_else(|| SchemaError::ConditionBeyondRoot(parsed.field.to_string()))?;
    let Value::Struct(map) = target.value else {
        return Err(SchemaError::ConditionTargetNotStruct {
            key: parsed.field.to_string(),
            found: target.value.type_name().to_string(),
        });
    };

    let actual = map.get(parsed.field);
    match comparator {
        Comparator::Eqi => compare_equals(parsed.field, actual, literal, true),
        Comparator::Neqi => Ok(!compare_equals(parsed.field, actual, literal, true)?),
        Comparator::Eq => compare_equals(parsed.field, actual, literal, false),
        Comparator::Neq => Ok(!compare_equals(parsed.field, actual, literal, false)?),
        Comparator::Gt => compare_order(parsed.field, actual, literal, |a, s| a > s),
        Comparator::Gte => compare_order(parsed.field, actual, literal, |a, s| a >= s),
        Comparator::Lt => compare_order(parsed.field, actual, literal, |a, s| a < s),
        Comparator::Lte => compare_order(parsed.field, actual, literal, |a, s| a <= s),
        Comparator::Ex => Ok(map.contains_key(parsed.field)),
        Comparator::Nex => Ok(!map.contains_key(parsed.field)),
    }
}

/// Equality over the scalar pairings the grammar admits.
///
/// A null literal means "the field is null or absent". Any other pairing
/// of kinds is a prototype defect, not an unequal result.
fn compare_equals(
    field: &str,
    actual: Option<&Value>,
    literal: &Value,
    ignore_case: bool,
) -> Result<bool> {
    if literal.is_null() {
        return Ok(actual.is_none_or(Value::is_null));
    }
    match (literal, actual) {
        (Value::String(standard), Some(Value::String(found))) => {
            if ignore_case {
                Ok(standard.eq_ignore_ascii_case(found))
            } else {
                Ok(standard == found)
            }
        }
        (Value::Number(standard), Some(Value::Number(found))) => Ok(standard == found),
        (Value::Bool(standard), Some(Value::Bool(found))) => Ok(standard == found),
        _ => Err(SchemaError::ConditionTypeMismatch {
            key: field.to_string(),
            expected: literal.type_name().to_string(),
            found: actual.map_or("absent", Value::type_name).to_string(),
        }),
    }
}

/// Ordering in the f64 domain. A non-numeric data value is simply false;
/// a non-numeric literal is a prototype defect.
fn compare_order(
    field: &str,
    actual: Option<&Value>,
    literal: &Value,
    op: impl Fn(f64, f64) -> bool,
) -> Result<bool> {
    let Some(standard) = literal.as_f64() else {
        return Err(SchemaError::NonNumericConditionBound(field.to_string()));
    };
    Ok(actual
        .and_then(Value::as_f64)
        .is_some_and(|found| op(found, standard)))
}
