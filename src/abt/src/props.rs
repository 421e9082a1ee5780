// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Properties derived by the optimizer, and the table joining them to nodes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::index_bounds::IndexReqTarget;
use crate::node::{Abt, GroupId, NodeHandle, ProjectionName};

/// An estimated number of rows.
pub type CardinalityEstimate = f64;

/// An estimated cost, in abstract units.
pub type Cost = f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollationOp {
    Ascending,
    Descending,
    Clustered,
}

impl fmt::Display for CollationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollationOp::Ascending => f.write_str("Ascending"),
            CollationOp::Descending => f.write_str("Descending"),
            CollationOp::Clustered => f.write_str("Clustered"),
        }
    }
}

/// The required sort order of a node's output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollationRequirement(pub Vec<(ProjectionName, CollationOp)>);

impl fmt::Display for CollationRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self
            .0
            .iter()
            .map(|(projection, op)| format!("{}: {}", projection, op))
            .join(", ");
        write!(f, "{{{}}}", spec)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitSkipRequirement {
    pub limit: i64,
    pub skip: i64,
}

impl LimitSkipRequirement {
    /// The `limit` of a requirement that does not bound its input.
    pub const NO_LIMIT: i64 = i64::MAX;

    pub fn new(limit: i64, skip: i64) -> LimitSkipRequirement {
        LimitSkipRequirement { limit, skip }
    }

    pub fn has_limit(&self) -> bool {
        self.limit != Self::NO_LIMIT
    }
}

impl fmt::Display for LimitSkipRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_limit() {
            write!(f, "limit: {}, skip: {}", self.limit, self.skip)
        } else {
            write!(f, "limit: (none), skip: {}", self.skip)
        }
    }
}

/// Which index-related alternatives an implementation must produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexingRequirement {
    pub target: IndexReqTarget,
    /// Whether record ids must be de-duplicated.
    pub dedup_rid: bool,
}

/// A group's ability to be served by index scans over a single collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexingAvailability {
    pub scan_group_id: GroupId,
    pub scan_projection: ProjectionName,
    pub scan_def_name: String,
    pub eq_predicate_only: bool,
}

/// Properties shared by all alternatives of a memo group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogicalProps {
    pub cardinality_estimate: Option<CardinalityEstimate>,
    pub projection_availability: Option<BTreeSet<ProjectionName>>,
    pub indexing_availability: Option<IndexingAvailability>,
    pub collection_availability: Option<BTreeSet<String>>,
}

/// Properties required of a physical alternative.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhysProps {
    pub collation: Option<CollationRequirement>,
    pub limit_skip: Option<LimitSkipRequirement>,
    pub projections: Option<Vec<ProjectionName>>,
    pub indexing: Option<IndexingRequirement>,
    pub repetition_estimate: Option<f64>,
    pub limit_estimate: Option<f64>,
}

/// Annotations attached to a node of a finalized physical plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeProps {
    /// The id under which the runtime reports on this node.
    pub plan_node_id: i32,
    pub group_id: GroupId,
    pub logical_props: LogicalProps,
    pub physical_props: PhysProps,
    /// Cost of the subtree rooted at this node.
    pub cost: Cost,
    /// Cost of this node alone.
    pub local_cost: Cost,
    /// Estimated output cardinality, adjusted for the node's requirements.
    pub adjusted_ce: CardinalityEstimate,
}

impl NodeProps {
    pub fn new(plan_node_id: i32, cost: Cost, adjusted_ce: CardinalityEstimate) -> NodeProps {
        NodeProps {
            plan_node_id,
            cost,
            adjusted_ce,
            ..Default::default()
        }
    }
}

/// Maps plan nodes, by identity, to their [`NodeProps`].
///
/// The table is populated when a physical plan is finalized and is only read
/// afterwards; callers that do not need annotations pass an empty one.
#[derive(Clone, Debug, Default)]
pub struct NodeToGroupPropsMap(BTreeMap<NodeHandle, NodeProps>);

impl NodeToGroupPropsMap {
    pub fn new() -> NodeToGroupPropsMap {
        NodeToGroupPropsMap::default()
    }

    /// Annotates `node`, returning the previous annotation, if any.
    pub fn insert(&mut self, node: &Abt, props: NodeProps) -> Option<NodeProps> {
        self.0.insert(node.handle(), props)
    }

    pub fn find(&self, node: &Abt) -> Option<&NodeProps> {
        self.0.get(&node.handle())
    }

    pub fn remove(&mut self, node: &Abt) -> Option<NodeProps> {
        self.0.remove(&node.handle())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A finalized plan together with its annotations.
#[derive(Clone, Debug)]
pub struct PlanAndProps {
    pub node: Abt,
    pub map: NodeToGroupPropsMap,
}
