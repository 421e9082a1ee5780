// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Explaining a memo, independently of any plan extracted from it.

use mz_abt::memo::{MemoExplainInterface, PhysicalEntry};

use crate::artifacts::{logical_props_tree, phys_props_tree};
use crate::config::{ExplainOptions, ExplainVersion};
use crate::document::{Document, Value};
use crate::structured::{
    logical_props_document, phys_props_document, usize_value, StructuredExplainer,
};
use crate::text::TextExplainer;
use crate::tree::PrintTree;

fn cost_limit_text(entry: &PhysicalEntry) -> String {
    match entry.cost_limit {
        Some(limit) => limit.to_string(),
        None => "(none)".to_owned(),
    }
}

/// The properties a physical alternative was optimized for and the costing
/// of its winner, under `header`. The winning plan is printed only when a
/// `printer` is given.
pub(crate) fn physical_entry_tree(
    header: String,
    entry: &PhysicalEntry,
    printer: Option<&TextExplainer>,
) -> PrintTree {
    let mut tree = PrintTree::new(header);
    let props = phys_props_tree("physicalProperties:", &entry.props);
    if props.has_fields() {
        tree.push_field(props);
    }
    match &entry.node_info {
        Some(info) => {
            let mut node_info = PrintTree::new(format!(
                "nodeInfo: [cost: {}, localCost: {}, adjustedCE: {}]",
                info.cost, info.local_cost, info.adjusted_ce
            ));
            if let Some(printer) = printer {
                node_info.push_field(printer.node_tree(&info.node));
            }
            tree.push_field(node_info);
        }
        None => tree.push_field(PrintTree::new("nodeInfo: (failed to optimize)")),
    }
    tree
}

/// The tree shown under a physical delegator for its memo entry.
pub(crate) fn delegated_physical_tree(entry: &PhysicalEntry) -> PrintTree {
    let header = format!("memoPhysicalNode: costLimit: {}", cost_limit_text(entry));
    physical_entry_tree(header, entry, None)
}

/// Appends the document form of [`physical_entry_tree`] to `doc`.
pub(crate) fn append_physical_entry(
    doc: &mut Document,
    entry: &PhysicalEntry,
    printer: Option<&StructuredExplainer>,
) {
    match entry.cost_limit {
        Some(limit) => doc.append("costLimit", limit),
        None => doc.append("costLimit", Value::Null),
    };
    doc.append("physicalProperties", phys_props_document(&entry.props));
    if let Some(info) = &entry.node_info {
        let node_info = doc
            .subdocument("nodeInfo")
            .append("cost", info.cost)
            .append("localCost", info.local_cost)
            .append("adjustedCE", info.adjusted_ce);
        if let Some(printer) = printer {
            node_info.append("node", printer.explain(&info.node));
        }
    }
}

pub(crate) fn explain_memo_text(memo: &dyn MemoExplainInterface) -> String {
    let options = ExplainOptions::new(ExplainVersion::V2);
    let printer = TextExplainer::new(&options);

    let mut tree = PrintTree::new("Memo:");
    for group_id in 0..memo.group_count() {
        let mut group = PrintTree::new(format!("group #{}:", group_id));

        let mut logical_nodes = PrintTree::new("logicalNodes:");
        for (i, node) in memo.logical_nodes(group_id).unwrap_or_default().iter().enumerate() {
            logical_nodes.push_field(
                PrintTree::new(format!("logicalNodeId: {}", i)).field(printer.node_tree(node)),
            );
        }
        group.push_field(logical_nodes);

        if let Some(props) = memo.logical_props(group_id) {
            let logical = logical_props_tree("logicalProperties:", props);
            if logical.has_fields() {
                group.push_field(logical);
            }
        }

        let mut physical_nodes = PrintTree::new("physicalNodes:");
        for (i, entry) in memo.physical_nodes(group_id).unwrap_or_default().iter().enumerate() {
            let header = format!("physicalNodeId: {}, costLimit: {}", i, cost_limit_text(entry));
            physical_nodes.push_field(physical_entry_tree(header, entry, Some(&printer)));
        }
        group.push_field(physical_nodes);

        tree.push_field(group);
    }
    tree.into_text()
}

pub(crate) fn explain_memo_document(memo: &dyn MemoExplainInterface) -> Document {
    let options = ExplainOptions::new(ExplainVersion::V3);
    let printer = StructuredExplainer::new(&options);

    let mut groups = vec![];
    for group_id in 0..memo.group_count() {
        let mut group = Document::new();
        group.append("groupId", usize_value(group_id));

        let logical_nodes = memo
            .logical_nodes(group_id)
            .unwrap_or_default()
            .iter()
            .map(|node| Value::from(printer.explain(node)))
            .collect::<Vec<_>>();
        group.append("logicalNodes", logical_nodes);

        if let Some(props) = memo.logical_props(group_id) {
            group.append("logicalProperties", logical_props_document(props));
        }

        let mut physical_nodes = vec![];
        for (i, entry) in memo.physical_nodes(group_id).unwrap_or_default().iter().enumerate() {
            let mut physical = Document::new();
            physical.append("physicalNodeId", usize_value(i));
            append_physical_entry(&mut physical, entry, Some(&printer));
            physical_nodes.push(Value::from(physical));
        }
        group.append("physicalNodes", physical_nodes);

        groups.push(Value::from(group));
    }

    let mut doc = Document::new();
    doc.append("groups", groups);
    doc
}
