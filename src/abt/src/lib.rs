// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The algebraic plan tree (ABT) handed to `EXPLAIN`.
//!
//! An ABT is an immutable, reference-counted tree of plan [`Node`]s whose
//! nodes carry scalar and path [`Expr`]essions. Trees compare structurally,
//! while per-node annotations computed by the optimizer are keyed by the
//! [`NodeHandle`] that every node receives when it is constructed.
//!
//! Besides the tree itself this crate holds the optimizer artifacts that
//! `EXPLAIN` knows how to render: logical and physical property records,
//! index bounds, partial schema requirements, candidate indexes, catalog
//! metadata and a read-only view of the memo.

pub mod index_bounds;
pub mod memo;
pub mod metadata;
pub mod node;
pub mod props;
pub mod syntax;

pub use crate::node::{
    Abt, CoScanNode, CollationNode, EvaluationNode, FieldProjectionMap, FilterNode, GroupId,
    IndexScanNode, JoinType, LimitSkipNode, MemoLogicalDelegatorNode, MemoPhysicalDelegatorNode,
    NestedLoopJoinNode, Node, NodeHandle, PhysicalScanNode, ProjectionName, RootNode, SargableNode,
    ScanNode, ScanOrder, SeekNode, UnionNode,
};
pub use crate::props::{NodeProps, NodeToGroupPropsMap, PlanAndProps};
pub use crate::syntax::{Datum, Expr, Operations};
