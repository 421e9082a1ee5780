// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A read-only view of the optimizer's memo.

use crate::node::{Abt, GroupId};
use crate::props::{CardinalityEstimate, Cost, LogicalProps, PhysProps};

/// The winning plan of a physical alternative.
#[derive(Clone, Debug)]
pub struct PhysicalNodeInfo {
    pub node: Abt,
    pub cost: Cost,
    pub local_cost: Cost,
    pub adjusted_ce: CardinalityEstimate,
}

/// A physical alternative of a group: the properties it was optimized for
/// and, if optimization succeeded, its best plan.
#[derive(Clone, Debug)]
pub struct PhysicalEntry {
    pub props: PhysProps,
    pub cost_limit: Option<Cost>,
    pub node_info: Option<PhysicalNodeInfo>,
}

/// What `EXPLAIN` needs to know about a memo.
///
/// Every accessor returns `None` for a group id that is out of range.
pub trait MemoExplainInterface {
    fn group_count(&self) -> usize;
    fn logical_nodes(&self, group_id: GroupId) -> Option<&[Abt]>;
    fn logical_props(&self, group_id: GroupId) -> Option<&LogicalProps>;
    fn physical_nodes(&self, group_id: GroupId) -> Option<&[PhysicalEntry]>;
}

#[derive(Clone, Debug, Default)]
pub struct Group {
    pub logical_nodes: Vec<Abt>,
    pub logical_props: LogicalProps,
    pub physical_nodes: Vec<PhysicalEntry>,
}

/// A memo held in memory, with groups numbered in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Memo {
    groups: Vec<Group>,
}

impl Memo {
    pub fn new() -> Memo {
        Memo::default()
    }

    /// Appends `group` and returns its id.
    pub fn add_group(&mut self, group: Group) -> GroupId {
        self.groups.push(group);
        self.groups.len() - 1
    }
}

impl MemoExplainInterface for Memo {
    fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn logical_nodes(&self, group_id: GroupId) -> Option<&[Abt]> {
        self.groups.get(group_id).map(|g| g.logical_nodes.as_slice())
    }

    fn logical_props(&self, group_id: GroupId) -> Option<&LogicalProps> {
        self.groups.get(group_id).map(|g| &g.logical_props)
    }

    fn physical_nodes(&self, group_id: GroupId) -> Option<&[PhysicalEntry]> {
        self.groups.get(group_id).map(|g| g.physical_nodes.as_slice())
    }
}
