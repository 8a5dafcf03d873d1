//! Parent-linked scope nodes for ancestor-aware validation.
//!
//! Every recursive validation step wraps the value it is examining in a
//! [`ScopeNode`] pointing at its enclosing scope. Dynamic conditions use
//! the parent links to compare against fields of ancestor structs, and
//! backtracking failure reports use the depth for indentation.

use crate::value::Value;

/// A value under examination together with a link to its enclosing scope.
///
/// Parents are borrowed: each ancestor lives higher on the call stack and
/// outlives the child node, so no ownership juggling is needed.
///
/// # Examples
///
/// ```
/// use json_prototype_core::{ScopeNode, Value};
///
/// let root_value = Value::from("root");
/// let child_value = Value::from("child");
/// let root = ScopeNode::root(&root_value);
/// let child = root.child(&child_value);
///
/// assert_eq!(child.depth(), 1);
/// assert_eq!(child.ancestor(1).unwrap().value.as_str(), Some("root"));
/// assert!(child.ancestor(2).is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScopeNode<'a> {
    /// The value currently being examined.
    pub value: &'a Value,
    /// The enclosing scope, if any.
    pub parent: Option<&'a ScopeNode<'a>>,
}

impl<'a> ScopeNode<'a> {
    /// Creates a root scope with no parent.
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            parent: None,
        }
    }

    /// Creates a child scope enclosed by `self`.
    pub fn child(&'a self, value: &'a Value) -> Self {
        Self {
            value,
            parent: Some(self),
        }
    }

    /// Number of parent links above this node.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self;
        while let Some(parent) = node.parent {
            depth += 1;
            node = parent;
        }
        depth
    }

    /// Follows `levels` parent links; `None` if that runs past the root.
    ///
    /// `ancestor(0)` is the node itself.
    pub fn ancestor(&self, levels: usize) -> Option<&ScopeNode<'a>> {
        let mut node = self;
        for _ in 0..levels {
            node = node.parent?;
        }
        Some(node)
    }
}
