//! Composition operators over child schemas: allOf, anyOf, oneOf, not.
//!
//! Each operator is written against a `run` callback so the boxed-value and
//! known-integer validation paths share one set of operator semantics.

use serde_json::Value;

use crate::compile::{self, Compiler, SchemaError};
use crate::result::ValidateResult;
use super::{Meta, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllOfNode {
    pub meta: Meta,
    pub branches: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyOfNode {
    pub meta: Meta,
    pub branches: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OneOfNode {
    pub meta: Meta,
    pub branches: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotNode {
    pub meta: Meta,
    pub child: NodeId,
}

impl AllOfNode {
    /// Valid iff every branch validates; the first branch failure is
    /// returned verbatim (branch order = declaration order).
    pub fn validate_with(&self, mut run: impl FnMut(NodeId) -> ValidateResult) -> ValidateResult {
        for &id in &self.branches {
            let r = run(id);
            if r.is_failure() {
                return r;
            }
        }
        ValidateResult::Success
    }
}

impl AnyOfNode {
    /// Valid iff at least one branch validates. On total failure the
    /// per-branch failures are carried for diagnostics.
    pub fn validate_with(&self, mut run: impl FnMut(NodeId) -> ValidateResult) -> ValidateResult {
        let mut failures = Vec::with_capacity(self.branches.len());
        for &id in &self.branches {
            let r = run(id);
            if r.is_success() {
                return ValidateResult::Success;
            }
            failures.push(r);
        }
        ValidateResult::AnyOfNoneMatched { failures }
    }
}

impl OneOfNode {
    /// Valid iff exactly one branch validates. Zero and more-than-one
    /// matches are distinct failures; every branch is evaluated.
    pub fn validate_with(&self, mut run: impl FnMut(NodeId) -> ValidateResult) -> ValidateResult {
        let mut matched = Vec::new();
        let mut failures = Vec::new();
        for (i, &id) in self.branches.iter().enumerate() {
            let r = run(id);
            if r.is_success() {
                matched.push(i);
            } else {
                failures.push(r);
            }
        }
        match matched.len() {
            1 => ValidateResult::Success,
            0 => ValidateResult::OneOfNoneMatched { failures },
            _ => ValidateResult::OneOfMultipleMatched { matched },
        }
    }
}

impl NotNode {
    pub fn validate_with(&self, mut run: impl FnMut(NodeId) -> ValidateResult) -> ValidateResult {
        if run(self.child).is_success() {
            ValidateResult::NotMatched
        } else {
            ValidateResult::Success
        }
    }
}

/// Compile a composition keyword's child array. Must be a non-empty array of
/// schema objects.
pub(crate) fn compile_branches(
    c: &mut Compiler,
    raw: &Value,
    keyword: &'static str,
) -> Result<Vec<NodeId>, SchemaError> {
    let children = raw
        .as_array()
        .ok_or_else(|| compile::malformed(keyword, "a non-empty array of schemas", raw))?;
    if children.is_empty() {
        return Err(compile::malformed(keyword, "a non-empty array of schemas", raw));
    }
    children.iter().map(|child| c.compile_child(child)).collect()
}
