// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The indented text dialects: `V1`, `V2` and `V2Compact`.

use itertools::Itertools;
use mz_abt::memo::MemoExplainInterface;
use mz_abt::props::NodeProps;
use mz_abt::{Abt, Expr, Node, NodeToGroupPropsMap};

use crate::artifacts::{
    braced, explain_candidate_index, explain_compound_interval_expr,
    explain_partial_schema_req_expr, logical_props_tree, phys_props_tree,
};
use crate::config::{ExplainOptions, ExplainVersion};
use crate::memo::delegated_physical_tree;
use crate::tree::PrintTree;

pub(crate) fn expr_header(expr: &Expr) -> String {
    let attr = match expr {
        Expr::Constant(datum) => datum.to_string(),
        Expr::Variable(name) => name.to_string(),
        Expr::UnaryOp { op, .. } | Expr::BinaryOp { op, .. } | Expr::PathCompare { op, .. } => {
            op.to_string()
        }
        Expr::FunctionCall { name, .. } => name.clone(),
        Expr::PathGet { field, .. } => field.clone(),
        Expr::PathTraverse { max_depth, .. } => match max_depth {
            Some(depth) => depth.to_string(),
            None => "inf".to_owned(),
        },
        Expr::If { .. }
        | Expr::EvalPath { .. }
        | Expr::EvalFilter { .. }
        | Expr::PathIdentity
        | Expr::PathConstant(_)
        | Expr::PathComposeM { .. } => String::new(),
    };
    format!("{} [{}]", expr.name(), attr)
}

pub(crate) fn expr_tree(expr: &Expr, compact: bool) -> PrintTree {
    let mut tree = PrintTree::new(expr_header(expr));
    for child in expr.children() {
        tree.push_input(expr_tree(child, compact));
    }
    tree.set_compact(compact);
    tree
}

/// The single-line form of `expr`.
pub(crate) fn expr_line(expr: &Expr) -> String {
    expr_tree(expr, true).into_line()
}

/// The parts of a node that are printed besides its inputs.
#[derive(Default)]
struct NodeParts<'a> {
    attrs: Vec<(&'static str, String)>,
    exprs: Vec<(&'static str, &'a Expr)>,
    extras: Vec<PrintTree>,
}

fn node_parts(node: &Node) -> NodeParts<'_> {
    let mut parts = NodeParts::default();
    match node {
        Node::Root(root) => {
            parts.attrs.push(("projections", braced(&root.projections)));
        }
        Node::Filter(filter) => {
            parts.exprs.push(("filter", &filter.filter));
        }
        Node::Evaluation(eval) => {
            parts.attrs.push(("projection", braced([&eval.projection])));
            parts.exprs.push(("expr", &eval.expr));
        }
        Node::Scan(scan) => {
            parts.attrs.push(("scanDefName", scan.scan_def_name.clone()));
            parts.attrs.push(("projection", braced([&scan.projection])));
        }
        Node::PhysicalScan(scan) => {
            parts.attrs.push(("fieldProjectionMap", scan.field_projection_map.to_string()));
            parts.attrs.push(("scanDefName", scan.scan_def_name.clone()));
            parts.attrs.push(("scanOrder", scan.scan_order.to_string()));
        }
        Node::IndexScan(scan) => {
            parts.attrs.push(("fieldProjectionMap", scan.field_projection_map.to_string()));
            parts.attrs.push(("scanDefName", scan.scan_def_name.clone()));
            parts.attrs.push(("indexDefName", scan.index_def_name.clone()));
            parts.attrs.push(("interval", explain_compound_interval_expr(&scan.interval)));
            let order = if scan.reversed { "Reverse" } else { "Forward" };
            parts.attrs.push(("scanOrder", order.to_owned()));
        }
        Node::Seek(seek) => {
            parts.attrs.push(("ridProjection", seek.rid_projection.to_string()));
            parts.attrs.push(("fieldProjectionMap", seek.field_projection_map.to_string()));
            parts.attrs.push(("scanDefName", seek.scan_def_name.clone()));
        }
        Node::LimitSkip(limit_skip) => {
            parts.attrs.push(("limitSkip", limit_skip.requirement.to_string()));
        }
        Node::CoScan(_) => {}
        Node::Collation(collation) => {
            parts.attrs.push(("collation", collation.requirement.to_string()));
        }
        Node::Union(union) => {
            parts.attrs.push(("projections", braced(&union.projections)));
        }
        Node::NestedLoopJoin(join) => {
            parts.attrs.push(("joinType", join.join_type.to_string()));
            parts.attrs.push(("correlatedProjections", braced(&join.correlated_projections)));
            parts.exprs.push(("filter", &join.filter));
        }
        Node::Sargable(sargable) => {
            parts.attrs.push(("target", sargable.target.to_string()));
            parts.extras.push(PrintTree::new(format!(
                "requirements: {}",
                explain_partial_schema_req_expr(&sargable.requirements)
            )));
            if !sargable.candidate_indexes.is_empty() {
                let mut candidates = PrintTree::new("candidateIndexes:");
                for (i, entry) in sargable.candidate_indexes.iter().enumerate() {
                    candidates.push_field(PrintTree::new(format!(
                        "candidateId: {}, {}",
                        i,
                        explain_candidate_index(entry)
                    )));
                }
                parts.extras.push(candidates);
            }
        }
        Node::MemoLogicalDelegator(delegator) => {
            parts.attrs.push(("groupId", delegator.group_id.to_string()));
        }
        Node::MemoPhysicalDelegator(delegator) => {
            parts.attrs.push(("groupId", delegator.group_id.to_string()));
            parts.attrs.push(("index", delegator.index.to_string()));
        }
    }
    parts
}

/// The `V2` header of `node`: its kind with the values of its attributes.
pub(crate) fn node_header(node: &Node) -> String {
    let parts = node_parts(node);
    format!(
        "{} [{}]",
        node.name(),
        parts.attrs.iter().map(|(_, value)| value).join(", ")
    )
}

fn properties_tree(props: &NodeProps) -> PrintTree {
    let mut tree = PrintTree::new(format!(
        "Properties [planNodeId: {}, groupId: {}, cost: {}, localCost: {}, adjustedCE: {}]",
        props.plan_node_id, props.group_id, props.cost, props.local_cost, props.adjusted_ce,
    ));
    let logical = logical_props_tree("logical:", &props.logical_props);
    if logical.has_fields() {
        tree.push_field(logical);
    }
    let physical = phys_props_tree("physical:", &props.physical_props);
    if physical.has_fields() {
        tree.push_field(physical);
    }
    tree
}

/// Renders plans in one of the text dialects.
///
/// Unlike the user-facing dialect, nodes without an entry in the property
/// table are printed without annotations.
pub(crate) struct TextExplainer<'a> {
    version: ExplainVersion,
    display_properties: bool,
    memo: Option<&'a dyn MemoExplainInterface>,
    node_props: &'a NodeToGroupPropsMap,
}

impl<'a> TextExplainer<'a> {
    pub fn new(options: &ExplainOptions<'a>) -> TextExplainer<'a> {
        debug_assert!(options.version.is_text());
        TextExplainer {
            version: options.version,
            display_properties: options.display_properties,
            memo: options.memo,
            node_props: options.node_props,
        }
    }

    pub fn explain(&self, node: &Abt) -> String {
        self.node_tree(node).into_text()
    }

    pub fn node_tree(&self, node: &Abt) -> PrintTree {
        let parts = node_parts(node.node());

        let mut tree = match self.version {
            ExplainVersion::V1 => PrintTree::new(format!("{} []", node.node().name())),
            _ => PrintTree::new(node_header(node.node())),
        };

        if self.display_properties {
            if let Some(props) = self.node_props.find(node) {
                tree.push_field(properties_tree(props));
            }
            if let Some(memo) = self.memo {
                match node.node() {
                    Node::MemoLogicalDelegator(delegator) => {
                        if let Some(props) = memo.logical_props(delegator.group_id) {
                            let logical = logical_props_tree("logicalProperties:", props);
                            if logical.has_fields() {
                                tree.push_field(logical);
                            }
                        }
                    }
                    Node::MemoPhysicalDelegator(delegator) => {
                        let entry = memo
                            .physical_nodes(delegator.group_id)
                            .and_then(|entries| entries.get(delegator.index));
                        if let Some(entry) = entry {
                            tree.push_field(delegated_physical_tree(entry));
                        }
                    }
                    _ => {}
                }
            }
        }

        if self.version == ExplainVersion::V1 {
            for (label, value) in &parts.attrs {
                tree.push_field(PrintTree::new(format!("{}: {}", label, value)));
            }
        }

        for (label, expr) in parts.exprs {
            let compact = self.version == ExplainVersion::V2Compact;
            let rendered = expr_tree(expr, compact);
            if self.version == ExplainVersion::V1 {
                tree.push_field(PrintTree::new(format!("{}:", label)).field(rendered));
            } else {
                tree.push_field(rendered);
            }
        }

        for extra in parts.extras {
            tree.push_field(extra);
        }

        for child in node.children() {
            tree.push_input(self.node_tree(child));
        }
        tree
    }
}
