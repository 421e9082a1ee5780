// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Plan nodes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::index_bounds::{CandidateIndexEntry, CompoundIntervalReqExpr, IndexReqTarget, PSRExpr};
use crate::props::{CollationRequirement, LimitSkipRequirement};
use crate::syntax::Expr;

/// The name of a column produced by a plan node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectionName(String);

impl ProjectionName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectionName {
    fn from(name: &str) -> ProjectionName {
        ProjectionName(name.to_owned())
    }
}

impl From<String> for ProjectionName {
    fn from(name: String) -> ProjectionName {
        ProjectionName(name)
    }
}

impl fmt::Display for ProjectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies an equivalence class of plans in the memo.
pub type GroupId = usize;

/// The identity of a node.
///
/// Handles are allocated by [`Abt::new`] and are unique for the lifetime of
/// the process. Annotations computed by the optimizer are keyed by handle, so
/// two structurally equal nodes at different positions of a tree can carry
/// different annotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

impl NodeHandle {
    fn allocate() -> NodeHandle {
        NodeHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// An immutable, shared reference to a plan node.
///
/// Cloning an `Abt` shares the node (and its [`NodeHandle`]). Equality is
/// structural: two trees are equal iff their nodes have the same kind, the
/// same fields and equal children, regardless of their handles.
#[derive(Clone)]
pub struct Abt(Arc<AbtInner>);

#[derive(Debug)]
struct AbtInner {
    handle: NodeHandle,
    node: Node,
}

impl Abt {
    /// Wraps `node` and assigns it a fresh handle.
    pub fn new(node: impl Into<Node>) -> Abt {
        Abt(Arc::new(AbtInner {
            handle: NodeHandle::allocate(),
            node: node.into(),
        }))
    }

    pub fn handle(&self) -> NodeHandle {
        self.0.handle
    }

    pub fn node(&self) -> &Node {
        &self.0.node
    }

    pub fn children(&self) -> Vec<&Abt> {
        self.0.node.children()
    }

    /// Returns `true` iff `self` and `other` are the same node, as opposed
    /// to merely equal ones.
    pub fn is_same(&self, other: &Abt) -> bool {
        self.0.handle == other.0.handle
    }

    /// Calls `f` on every node of the tree, parents before children and
    /// children left to right.
    pub fn visit_pre<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Abt),
    {
        f(self);
        for child in self.children() {
            child.visit_pre(f);
        }
    }

    /// The number of nodes in the tree.
    pub fn size(&self) -> usize {
        let mut size = 0;
        self.visit_pre(&mut |_| size += 1);
        size
    }
}

impl PartialEq for Abt {
    fn eq(&self, other: &Abt) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.node == other.0.node
    }
}

impl fmt::Debug for Abt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Abt")
            .field("handle", &self.0.handle)
            .field("node", &self.0.node)
            .finish()
    }
}

/// Order in which a collection scan visits documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScanOrder {
    Forward,
    Reverse,
    Random,
}

impl fmt::Display for ScanOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOrder::Forward => f.write_str("Forward"),
            ScanOrder::Reverse => f.write_str("Reverse"),
            ScanOrder::Random => f.write_str("Random"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => f.write_str("Inner"),
            JoinType::Left => f.write_str("Left"),
            JoinType::Full => f.write_str("Full"),
        }
    }
}

/// Binds the record id, the whole document and individual top-level fields
/// produced by a scan to projections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldProjectionMap {
    pub rid_projection: Option<ProjectionName>,
    pub root_projection: Option<ProjectionName>,
    pub field_projections: BTreeMap<String, ProjectionName>,
}

impl FieldProjectionMap {
    /// A map binding only the whole document to `projection`.
    pub fn root(projection: impl Into<ProjectionName>) -> FieldProjectionMap {
        FieldProjectionMap {
            root_projection: Some(projection.into()),
            ..Default::default()
        }
    }

    pub fn with_field(
        mut self,
        field: impl Into<String>,
        projection: impl Into<ProjectionName>,
    ) -> FieldProjectionMap {
        self.field_projections
            .insert(field.into(), projection.into());
        self
    }

    /// `(field, projection)` pairs, the record id and root first.
    pub fn entries(&self) -> Vec<(&str, &ProjectionName)> {
        let rid = self.rid_projection.iter().map(|p| ("<rid>", p));
        let root = self.root_projection.iter().map(|p| ("<root>", p));
        let fields = self
            .field_projections
            .iter()
            .map(|(field, p)| (field.as_str(), p));
        rid.chain(root).chain(fields).collect()
    }
}

impl fmt::Display for FieldProjectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .entries()
            .into_iter()
            .map(|(field, projection)| format!("'{}': {}", field, projection))
            .join(", ");
        write!(f, "{{{}}}", entries)
    }
}

/// The top of every plan: the projections returned to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct RootNode {
    pub projections: Vec<ProjectionName>,
    pub child: Abt,
}

/// Keeps the rows for which `filter` holds.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterNode {
    pub filter: Expr,
    pub child: Abt,
}

/// Binds the result of `expr` to `projection`.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationNode {
    pub projection: ProjectionName,
    pub expr: Expr,
    pub child: Abt,
}

/// A logical collection scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanNode {
    pub projection: ProjectionName,
    pub scan_def_name: String,
}

/// A physical collection scan.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalScanNode {
    pub field_projection_map: FieldProjectionMap,
    pub scan_def_name: String,
    pub scan_order: ScanOrder,
}

/// A scan over the bounds `interval` of the index `index_def_name`.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexScanNode {
    pub field_projection_map: FieldProjectionMap,
    pub scan_def_name: String,
    pub index_def_name: String,
    pub interval: CompoundIntervalReqExpr,
    pub reversed: bool,
}

/// Fetches the document identified by `rid_projection`.
#[derive(Clone, Debug, PartialEq)]
pub struct SeekNode {
    pub rid_projection: ProjectionName,
    pub field_projection_map: FieldProjectionMap,
    pub scan_def_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LimitSkipNode {
    pub requirement: LimitSkipRequirement,
    pub child: Abt,
}

/// Produces an unbounded stream of empty rows.
#[derive(Clone, Debug, PartialEq)]
pub struct CoScanNode;

/// Sorts its input.
#[derive(Clone, Debug, PartialEq)]
pub struct CollationNode {
    pub requirement: CollationRequirement,
    pub child: Abt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionNode {
    pub projections: Vec<ProjectionName>,
    pub children: Vec<Abt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NestedLoopJoinNode {
    pub join_type: JoinType,
    /// Projections of `left` visible to `right`.
    pub correlated_projections: BTreeSet<ProjectionName>,
    pub filter: Expr,
    pub left: Abt,
    pub right: Abt,
}

/// A set of predicates over a single collection, together with the indexes
/// that can satisfy them. Only present in the memo's logical alternatives.
#[derive(Clone, Debug, PartialEq)]
pub struct SargableNode {
    pub requirements: PSRExpr,
    pub candidate_indexes: Vec<CandidateIndexEntry>,
    pub target: IndexReqTarget,
    pub child: Abt,
}

/// Stands in for the logical alternatives of a memo group.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoLogicalDelegatorNode {
    pub group_id: GroupId,
}

/// Stands in for the physical alternative `index` of a memo group.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoPhysicalDelegatorNode {
    pub group_id: GroupId,
    pub index: usize,
}

/// A plan node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Root(RootNode),
    Filter(FilterNode),
    Evaluation(EvaluationNode),
    Scan(ScanNode),
    PhysicalScan(PhysicalScanNode),
    IndexScan(IndexScanNode),
    Seek(SeekNode),
    LimitSkip(LimitSkipNode),
    CoScan(CoScanNode),
    Collation(CollationNode),
    Union(UnionNode),
    NestedLoopJoin(NestedLoopJoinNode),
    Sargable(SargableNode),
    MemoLogicalDelegator(MemoLogicalDelegatorNode),
    MemoPhysicalDelegator(MemoPhysicalDelegatorNode),
}

macro_rules! impl_from_node {
    ($($variant:ident($node:ty)),* $(,)?) => {
        $(
            impl From<$node> for Node {
                fn from(node: $node) -> Node {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_from_node!(
    Root(RootNode),
    Filter(FilterNode),
    Evaluation(EvaluationNode),
    Scan(ScanNode),
    PhysicalScan(PhysicalScanNode),
    IndexScan(IndexScanNode),
    Seek(SeekNode),
    LimitSkip(LimitSkipNode),
    CoScan(CoScanNode),
    Collation(CollationNode),
    Union(UnionNode),
    NestedLoopJoin(NestedLoopJoinNode),
    Sargable(SargableNode),
    MemoLogicalDelegator(MemoLogicalDelegatorNode),
    MemoPhysicalDelegator(MemoPhysicalDelegatorNode),
);

impl Node {
    pub fn name(&self) -> &'static str {
        match self {
            Node::Root(_) => "Root",
            Node::Filter(_) => "Filter",
            Node::Evaluation(_) => "Evaluation",
            Node::Scan(_) => "Scan",
            Node::PhysicalScan(_) => "PhysicalScan",
            Node::IndexScan(_) => "IndexScan",
            Node::Seek(_) => "Seek",
            Node::LimitSkip(_) => "LimitSkip",
            Node::CoScan(_) => "CoScan",
            Node::Collation(_) => "Collation",
            Node::Union(_) => "Union",
            Node::NestedLoopJoin(_) => "NestedLoopJoin",
            Node::Sargable(_) => "Sargable",
            Node::MemoLogicalDelegator(_) => "MemoLogicalDelegator",
            Node::MemoPhysicalDelegator(_) => "MemoPhysicalDelegator",
        }
    }

    /// The plan inputs of this node, in order.
    pub fn children(&self) -> Vec<&Abt> {
        match self {
            Node::Root(RootNode { child, .. })
            | Node::Filter(FilterNode { child, .. })
            | Node::Evaluation(EvaluationNode { child, .. })
            | Node::LimitSkip(LimitSkipNode { child, .. })
            | Node::Collation(CollationNode { child, .. })
            | Node::Sargable(SargableNode { child, .. }) => vec![child],
            Node::Union(UnionNode { children, .. }) => children.iter().collect(),
            Node::NestedLoopJoin(NestedLoopJoinNode { left, right, .. }) => vec![left, right],
            Node::Scan(_)
            | Node::PhysicalScan(_)
            | Node::IndexScan(_)
            | Node::Seek(_)
            | Node::CoScan(_)
            | Node::MemoLogicalDelegator(_)
            | Node::MemoPhysicalDelegator(_) => vec![],
        }
    }
}
