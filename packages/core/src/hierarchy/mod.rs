//! Hierarchy Builder
//!
//! Reorganizes a flat, ordered collection of records (each optionally
//! referencing a parent by id) into a forest of nodes carrying their direct
//! children. Used for product categories and variation-attribute trees, and
//! usable for any future self-referential table.
//!
//! # Architecture
//!
//! - **Pure function over fetched data**: no I/O, no shared state. Trees are
//!   rebuilt from scratch after every fetch and never persisted.
//! - **Two linear passes**: an id lookup pass, then a parent-attachment pass
//!   over the same input order. Sibling order is whatever the caller passed
//!   in; the builder never re-sorts.
//! - **Explicit policies**: unresolved parents and cyclic parent chains are
//!   handled by configurable policy instead of silent hard-coded behavior.
//!
//! # Example
//!
//! ```rust
//! use storefront_core::hierarchy::{HierarchyBuilder, HierarchyRecord};
//!
//! #[derive(Clone)]
//! struct Row { id: String, parent: Option<String> }
//!
//! impl HierarchyRecord for Row {
//!     fn id(&self) -> &str { &self.id }
//!     fn parent_id(&self) -> Option<&str> { self.parent.as_deref() }
//! }
//!
//! let rows = vec![
//!     Row { id: "a".into(), parent: None },
//!     Row { id: "b".into(), parent: Some("a".into()) },
//! ];
//! let roots = HierarchyBuilder::default().build(&rows).unwrap();
//! assert_eq!(roots.len(), 1);
//! assert_eq!(roots[0].children[0].level, 1);
//! ```

use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// A flat record that can participate in a parent/child hierarchy.
///
/// `parent_id() == None` marks a root. The referenced parent, when present,
/// is expected to be another record of the same collection; what happens when
/// it is not is governed by [`UnresolvedParentPolicy`].
pub trait HierarchyRecord {
    /// Unique identifier of this record.
    fn id(&self) -> &str;

    /// Identifier of the parent record, if any.
    fn parent_id(&self) -> Option<&str>;
}

/// A record placed in the tree representation, with its direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    /// The flat record this node was built from.
    pub record: T,

    /// Depth in the forest: 0 for roots, parent's level + 1 otherwise.
    pub level: u32,

    /// Direct children, in the relative order of the input sequence.
    pub children: Vec<TreeNode<T>>,
}

/// Policy for records whose declared parent does not resolve in the input
/// set. Self-references (`id == parent_id`) are treated as unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedParentPolicy {
    /// Promote the record to a root (tolerant reference resolution).
    #[default]
    PromoteToRoot,

    /// Fail the build with [`HierarchyError::UnresolvedParent`].
    Error,
}

/// Policy for parent chains that cycle back to a descendant.
///
/// Cycle members are never reachable from any root, so they are detected
/// with a reachability sweep after attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Fail the build with [`HierarchyError::CycleDetected`].
    #[default]
    Error,

    /// Break each cycle by promoting its first member (in input order) to a
    /// root. Promoted roots are appended after the natural roots.
    PromoteToRoot,
}

/// Hierarchy construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Two records share the same identifier. Duplicate ids would make the
    /// lookup pass last-write-wins, so they are rejected up front.
    #[error("duplicate record id: {id}")]
    DuplicateId { id: String },

    /// A record references a parent that is not in the input set and the
    /// builder was configured with [`UnresolvedParentPolicy::Error`].
    #[error("record {id} references unknown parent {parent_id}")]
    UnresolvedParent { id: String, parent_id: String },

    /// One or more parent chains cycle. `ids` lists every record left
    /// unreachable from the roots (cycle members plus anything attached
    /// beneath them), in input order.
    #[error("cyclic parent chain involving: {}", .ids.join(", "))]
    CycleDetected { ids: Vec<String> },
}

impl HierarchyError {
    /// Create a duplicate id error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create an unresolved parent error
    pub fn unresolved_parent(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::UnresolvedParent {
            id: id.into(),
            parent_id: parent_id.into(),
        }
    }
}

/// Builds a forest from flat records.
///
/// The default configuration promotes orphans to roots (matching how the
/// category and attribute views behave) and rejects cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyBuilder {
    /// What to do with records whose parent does not resolve.
    pub unresolved_parent: UnresolvedParentPolicy,

    /// What to do when a parent chain cycles.
    pub cycles: CyclePolicy,
}

impl HierarchyBuilder {
    /// Create a builder with the default policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with explicit policies.
    pub fn with_policies(unresolved_parent: UnresolvedParentPolicy, cycles: CyclePolicy) -> Self {
        Self {
            unresolved_parent,
            cycles,
        }
    }

    /// Build the forest.
    ///
    /// Two linear passes over `records`:
    ///
    /// 1. Map each id to its input position (rejecting duplicates).
    /// 2. Attach each record to its parent's children list, or to the root
    ///    list when it has no parent or its parent does not resolve (per
    ///    [`UnresolvedParentPolicy`]).
    ///
    /// A reachability sweep then catches cyclic parent chains, which the
    /// attachment pass cannot reach from any root. Sibling order follows the
    /// input sequence; levels are 0 for roots and parent + 1 below.
    pub fn build<T>(&self, records: &[T]) -> Result<Vec<TreeNode<T>>, HierarchyError>
    where
        T: HierarchyRecord + Clone,
    {
        let n = records.len();

        let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (i, record) in records.iter().enumerate() {
            if index_of.insert(record.id(), i).is_some() {
                return Err(HierarchyError::duplicate_id(record.id()));
            }
        }

        let mut roots: Vec<usize> = Vec::new();
        let mut parent: Vec<Option<usize>> = Vec::with_capacity(n);
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, record) in records.iter().enumerate() {
            let resolved = match record.parent_id() {
                None => None,
                // Self-reference resolves to the record itself, which is not
                // a usable parent; treat it like a missing one.
                Some(p) => index_of.get(p).copied().filter(|&pi| pi != i),
            };

            match (record.parent_id(), resolved) {
                (_, Some(pi)) => {
                    parent.push(Some(pi));
                    children[pi].push(i);
                }
                (None, None) => {
                    parent.push(None);
                    roots.push(i);
                }
                (Some(p), None) => match self.unresolved_parent {
                    UnresolvedParentPolicy::PromoteToRoot => {
                        parent.push(None);
                        roots.push(i);
                    }
                    UnresolvedParentPolicy::Error => {
                        return Err(HierarchyError::unresolved_parent(record.id(), p));
                    }
                },
            }
        }

        let mut reachable = vec![false; n];
        Self::sweep(&roots, &children, &mut reachable);

        if reachable.iter().any(|r| !r) {
            match self.cycles {
                CyclePolicy::Error => {
                    let ids = records
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !reachable[*i])
                        .map(|(_, r)| r.id().to_string())
                        .collect();
                    return Err(HierarchyError::CycleDetected { ids });
                }
                CyclePolicy::PromoteToRoot => {
                    // Each pass promotes the first unreachable record, which
                    // frees its whole cycle (and subtree) in one sweep.
                    while let Some(i) = reachable.iter().position(|r| !r) {
                        if let Some(pi) = parent[i] {
                            children[pi].retain(|&c| c != i);
                        }
                        parent[i] = None;
                        roots.push(i);
                        Self::sweep(&[i], &children, &mut reachable);
                    }
                }
            }
        }

        Ok(roots
            .iter()
            .map(|&i| Self::assemble(i, 0, records, &children))
            .collect())
    }

    /// Mark every index reachable from `from` through the children lists.
    fn sweep(from: &[usize], children: &[Vec<usize>], reachable: &mut [bool]) {
        let mut queue: VecDeque<usize> = from.iter().copied().collect();
        while let Some(i) = queue.pop_front() {
            if reachable[i] {
                continue;
            }
            reachable[i] = true;
            queue.extend(children[i].iter().copied());
        }
    }

    /// Recursively build a node with its children.
    ///
    /// Recursion depth is bounded by tree depth; cycles were already
    /// resolved, so the walk terminates.
    fn assemble<T>(i: usize, level: u32, records: &[T], children: &[Vec<usize>]) -> TreeNode<T>
    where
        T: HierarchyRecord + Clone,
    {
        TreeNode {
            record: records[i].clone(),
            level,
            children: children[i]
                .iter()
                .map(|&c| Self::assemble(c, level + 1, records, children))
                .collect(),
        }
    }
}

/// Pre-order walk of a forest, yielding each record with its level.
///
/// This is the flattened form list views render: every node appears after
/// its parent and before its next sibling.
pub fn flatten<T>(roots: &[TreeNode<T>]) -> Vec<(&T, u32)> {
    fn walk<'a, T>(node: &'a TreeNode<T>, out: &mut Vec<(&'a T, u32)>) {
        out.push((&node.record, node.level));
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for root in roots {
        walk(root, &mut out);
    }
    out
}

/// Total node count of a forest (roots plus all descendants).
pub fn node_count<T>(roots: &[TreeNode<T>]) -> usize {
    roots
        .iter()
        .map(|node| 1 + node_count(&node.children))
        .sum()
}
