// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The structured `V3` dialect.

use mz_abt::memo::MemoExplainInterface;
use mz_abt::props::{
    CollationRequirement, LimitSkipRequirement, LogicalProps, NodeProps, PhysProps,
};
use mz_abt::{Abt, Datum, Expr, FieldProjectionMap, Node, NodeToGroupPropsMap};

use crate::artifacts::{
    explain_candidate_index, explain_compound_interval_expr, explain_partial_schema_req_expr,
};
use crate::config::ExplainOptions;
use crate::document::{Document, Value};
use crate::memo::append_physical_entry;

/// Ids and indexes as 64-bit integers. Values past `i64::MAX` have no
/// integer representation and are rendered as (lossy) doubles.
pub(crate) fn usize_value(n: usize) -> Value {
    match i64::try_from(n) {
        Ok(n) => Value::Int64(n),
        #[allow(clippy::as_conversions)]
        Err(_) => Value::Double(n as f64),
    }
}

fn names<'a, I, T>(items: I) -> Value
where
    I: IntoIterator<Item = &'a T>,
    T: ToString + 'a,
{
    Value::Array(
        items
            .into_iter()
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

fn datum_value(datum: &Datum) -> (&'static str, Value) {
    match datum {
        Datum::Nothing => ("Nothing", Value::Null),
        Datum::Null => ("Null", Value::Null),
        Datum::Boolean(b) => ("Boolean", Value::Boolean(*b)),
        Datum::Int32(i) => ("NumberInt32", Value::Int32(*i)),
        Datum::Int64(i) => ("NumberInt64", Value::Int64(*i)),
        Datum::Double(d) => ("NumberDouble", Value::Double(*d)),
        Datum::String(s) => ("String", Value::String(s.clone())),
        Datum::MinKey => ("MinKey", Value::Null),
        Datum::MaxKey => ("MaxKey", Value::Null),
    }
}

pub(crate) fn expr_document(expr: &Expr) -> Document {
    let mut doc = Document::new();
    doc.append("nodeType", expr.name());
    match expr {
        Expr::Constant(datum) => {
            let (tag, value) = datum_value(datum);
            doc.append("tag", tag).append("value", value);
        }
        Expr::Variable(name) => {
            doc.append("name", name.as_str());
        }
        Expr::UnaryOp { op, input } => {
            doc.append("op", op.name())
                .append("input", expr_document(input));
        }
        Expr::BinaryOp { op, left, right } => {
            doc.append("op", op.name())
                .append("left", expr_document(left))
                .append("right", expr_document(right));
        }
        Expr::If { cond, then, els } => {
            doc.append("condition", expr_document(cond))
                .append("then", expr_document(then))
                .append("else", expr_document(els));
        }
        Expr::FunctionCall { name, args } => {
            doc.append("name", name.as_str()).append(
                "arguments",
                Value::Array(args.iter().map(|a| Value::from(expr_document(a))).collect()),
            );
        }
        Expr::EvalPath { path, input } | Expr::EvalFilter { path, input } => {
            doc.append("path", expr_document(path))
                .append("input", expr_document(input));
        }
        Expr::PathIdentity => {}
        Expr::PathConstant(value) => {
            doc.append("value", expr_document(value));
        }
        Expr::PathGet { field, input } => {
            doc.append("fieldName", field.as_str())
                .append("input", expr_document(input));
        }
        Expr::PathTraverse { max_depth, input } => {
            let depth = match max_depth {
                Some(depth) => Value::Int64(i64::from(*depth)),
                None => Value::String("inf".to_owned()),
            };
            doc.append("maxDepth", depth)
                .append("input", expr_document(input));
        }
        Expr::PathCompare { op, value } => {
            doc.append("op", op.name())
                .append("value", expr_document(value));
        }
        Expr::PathComposeM { left, right } => {
            doc.append("left", expr_document(left))
                .append("right", expr_document(right));
        }
    }
    doc
}

pub(crate) fn field_projection_map_document(map: &FieldProjectionMap) -> Document {
    let mut doc = Document::new();
    for (field, projection) in map.entries() {
        doc.append(field, projection.as_str());
    }
    doc
}

pub(crate) fn logical_props_document(props: &LogicalProps) -> Document {
    let mut doc = Document::new();
    if let Some(ce) = props.cardinality_estimate {
        doc.append("cardinalityEstimate", ce);
    }
    if let Some(projections) = &props.projection_availability {
        doc.append("projections", names(projections));
    }
    if let Some(indexing) = &props.indexing_availability {
        doc.subdocument("indexingAvailability")
            .append("groupId", usize_value(indexing.scan_group_id))
            .append("scanProjection", indexing.scan_projection.as_str())
            .append("scanDefName", indexing.scan_def_name.as_str())
            .append("eqPredsOnly", indexing.eq_predicate_only);
    }
    if let Some(collections) = &props.collection_availability {
        doc.append("collectionAvailability", names(collections));
    }
    doc
}

pub(crate) fn phys_props_document(props: &PhysProps) -> Document {
    let mut doc = Document::new();
    if let Some(collation) = &props.collation {
        doc.append("collation", collation_value(collation));
    }
    if let Some(limit_skip) = &props.limit_skip {
        doc.append("limitSkip", limit_skip_document(limit_skip));
    }
    if let Some(projections) = &props.projections {
        doc.append("projections", names(projections));
    }
    if let Some(indexing) = &props.indexing {
        doc.subdocument("indexingRequirement")
            .append("indexReqTarget", indexing.target.to_string())
            .append("dedupRID", indexing.dedup_rid);
    }
    if let Some(estimate) = props.repetition_estimate {
        doc.append("repetitionEstimate", estimate);
    }
    if let Some(estimate) = props.limit_estimate {
        doc.append("limitEstimate", estimate);
    }
    doc
}

fn collation_value(requirement: &CollationRequirement) -> Value {
    let spec = requirement
        .0
        .iter()
        .map(|(projection, op)| {
            let mut entry = Document::new();
            entry
                .append("projectionName", projection.as_str())
                .append("collationOp", op.to_string());
            Value::from(entry)
        })
        .collect::<Vec<_>>();
    Value::from(spec)
}

fn limit_skip_document(requirement: &LimitSkipRequirement) -> Document {
    let mut doc = Document::new();
    if requirement.has_limit() {
        doc.append("limit", requirement.limit);
    } else {
        doc.append("limit", Value::Null);
    }
    doc.append("skip", requirement.skip);
    doc
}

fn node_props_document(props: &NodeProps) -> Document {
    let mut doc = Document::new();
    doc.append("planNodeId", props.plan_node_id)
        .append("groupId", usize_value(props.group_id))
        .append("cost", props.cost)
        .append("localCost", props.local_cost)
        .append("adjustedCE", props.adjusted_ce);
    let logical = logical_props_document(&props.logical_props);
    if !logical.is_empty() {
        doc.append("logicalProperties", logical);
    }
    let physical = phys_props_document(&props.physical_props);
    if !physical.is_empty() {
        doc.append("physicalProperties", physical);
    }
    doc
}

/// Renders plans as `V3` documents.
pub(crate) struct StructuredExplainer<'a> {
    display_properties: bool,
    memo: Option<&'a dyn MemoExplainInterface>,
    node_props: &'a NodeToGroupPropsMap,
}

impl<'a> StructuredExplainer<'a> {
    pub fn new(options: &ExplainOptions<'a>) -> StructuredExplainer<'a> {
        StructuredExplainer {
            display_properties: options.display_properties,
            memo: options.memo,
            node_props: options.node_props,
        }
    }

    pub fn explain(&self, node: &Abt) -> Document {
        let mut doc = Document::new();
        doc.append("nodeType", node.node().name());

        if self.display_properties {
            if let Some(props) = self.node_props.find(node) {
                doc.append("properties", node_props_document(props));
            }
        }

        match node.node() {
            Node::Root(root) => {
                doc.append("projections", names(&root.projections))
                    .append("child", self.explain(&root.child));
            }
            Node::Filter(filter) => {
                doc.append("filter", expr_document(&filter.filter))
                    .append("child", self.explain(&filter.child));
            }
            Node::Evaluation(eval) => {
                doc.append("projection", eval.projection.as_str())
                    .append("expression", expr_document(&eval.expr))
                    .append("child", self.explain(&eval.child));
            }
            Node::Scan(scan) => {
                doc.append("scanDefName", scan.scan_def_name.as_str())
                    .append("projection", scan.projection.as_str());
            }
            Node::PhysicalScan(scan) => {
                doc.append(
                    "fieldProjectionMap",
                    field_projection_map_document(&scan.field_projection_map),
                )
                .append("scanDefName", scan.scan_def_name.as_str())
                .append("scanOrder", scan.scan_order.to_string());
            }
            Node::IndexScan(scan) => {
                doc.append(
                    "fieldProjectionMap",
                    field_projection_map_document(&scan.field_projection_map),
                )
                .append("scanDefName", scan.scan_def_name.as_str())
                .append("indexDefName", scan.index_def_name.as_str())
                .append("interval", explain_compound_interval_expr(&scan.interval))
                .append("reversed", scan.reversed);
            }
            Node::Seek(seek) => {
                doc.append("ridProjection", seek.rid_projection.as_str())
                    .append(
                        "fieldProjectionMap",
                        field_projection_map_document(&seek.field_projection_map),
                    )
                    .append("scanDefName", seek.scan_def_name.as_str());
            }
            Node::LimitSkip(limit_skip) => {
                doc.append("limitSkip", limit_skip_document(&limit_skip.requirement))
                    .append("child", self.explain(&limit_skip.child));
            }
            Node::CoScan(_) => {}
            Node::Collation(collation) => {
                doc.append("collation", collation_value(&collation.requirement))
                    .append("child", self.explain(&collation.child));
            }
            Node::Union(union) => {
                let children = union
                    .children
                    .iter()
                    .map(|child| Value::from(self.explain(child)))
                    .collect::<Vec<_>>();
                doc.append("projections", names(&union.projections))
                    .append("children", children);
            }
            Node::NestedLoopJoin(join) => {
                doc.append("joinType", join.join_type.to_string())
                    .append("correlatedProjections", names(&join.correlated_projections))
                    .append("filter", expr_document(&join.filter))
                    .append("leftChild", self.explain(&join.left))
                    .append("rightChild", self.explain(&join.right));
            }
            Node::Sargable(sargable) => {
                let candidates = sargable
                    .candidate_indexes
                    .iter()
                    .map(|entry| Value::from(explain_candidate_index(entry)))
                    .collect::<Vec<_>>();
                doc.append("target", sargable.target.to_string())
                    .append(
                        "requirements",
                        explain_partial_schema_req_expr(&sargable.requirements),
                    )
                    .append("candidateIndexes", candidates)
                    .append("child", self.explain(&sargable.child));
            }
            Node::MemoLogicalDelegator(delegator) => {
                doc.append("groupId", usize_value(delegator.group_id));
                let memo_props = self
                    .memo
                    .filter(|_| self.display_properties)
                    .and_then(|memo| memo.logical_props(delegator.group_id));
                if let Some(props) = memo_props {
                    doc.append("logicalProperties", logical_props_document(props));
                }
            }
            Node::MemoPhysicalDelegator(delegator) => {
                doc.append("groupId", usize_value(delegator.group_id))
                    .append("index", usize_value(delegator.index));
                let entry = self
                    .memo
                    .filter(|_| self.display_properties)
                    .and_then(|memo| memo.physical_nodes(delegator.group_id))
                    .and_then(|entries| entries.get(delegator.index));
                if let Some(entry) = entry {
                    append_physical_entry(doc.subdocument("memoPhysicalNode"), entry, None);
                }
            }
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use mz_abt::memo::{Group, Memo, PhysicalEntry, PhysicalNodeInfo};
    use mz_abt::{
        CoScanNode, JoinType, MemoLogicalDelegatorNode, MemoPhysicalDelegatorNode,
        NestedLoopJoinNode, Operations, PhysicalScanNode, RootNode, ScanOrder,
    };

    use super::*;
    use crate::config::ExplainVersion;

    #[test]
    fn usize_values() {
        assert_eq!(usize_value(7), Value::Int64(7));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(usize_value(usize::MAX).type_tag(), crate::document::TypeTag::Double);
    }

    #[test]
    fn memo_delegators() {
        let mut memo = Memo::new();
        memo.add_group(Group {
            logical_nodes: vec![Abt::new(CoScanNode)],
            logical_props: LogicalProps {
                cardinality_estimate: Some(42.0),
                ..Default::default()
            },
            physical_nodes: vec![PhysicalEntry {
                props: PhysProps {
                    limit_skip: Some(LimitSkipRequirement::new(7, 3)),
                    ..Default::default()
                },
                cost_limit: Some(9.0),
                node_info: Some(PhysicalNodeInfo {
                    node: Abt::new(CoScanNode),
                    cost: 4.5,
                    local_cost: 1.0,
                    adjusted_ce: 42.0,
                }),
            }],
        });
        let plan = Abt::new(NestedLoopJoinNode {
            join_type: JoinType::Inner,
            correlated_projections: BTreeSet::new(),
            filter: Expr::constant(Datum::Boolean(true)),
            left: Abt::new(MemoLogicalDelegatorNode { group_id: 0 }),
            right: Abt::new(MemoPhysicalDelegatorNode {
                group_id: 0,
                index: 0,
            }),
        });

        let options = ExplainOptions::new(ExplainVersion::V3)
            .with_display_properties(true)
            .with_memo(&memo);
        let doc = StructuredExplainer::new(&options).explain(&plan);
        assert_eq!(
            doc.get("leftChild").and_then(Value::as_document).unwrap().to_string(),
            r#"{"nodeType":"MemoLogicalDelegator","groupId":0,"logicalProperties":{"cardinalityEstimate":42.0}}"#
        );
        assert_eq!(
            doc.get("rightChild").and_then(Value::as_document).unwrap().to_string(),
            r#"{"nodeType":"MemoPhysicalDelegator","groupId":0,"index":0,"memoPhysicalNode":{"costLimit":9.0,"physicalProperties":{"limitSkip":{"limit":7,"skip":3}},"nodeInfo":{"cost":4.5,"localCost":1.0,"adjustedCE":42.0}}}"#
        );

        let options = ExplainOptions::new(ExplainVersion::V3).with_memo(&memo);
        let doc = StructuredExplainer::new(&options).explain(&plan);
        assert_eq!(
            doc.get("rightChild").and_then(Value::as_document).unwrap().to_string(),
            r#"{"nodeType":"MemoPhysicalDelegator","groupId":0,"index":0}"#
        );
    }

    #[test]
    fn expression_document() {
        let expr = Expr::eval_filter(
            Expr::path_get("a", Expr::path_compare(Operations::Eq, Expr::int64(1))),
            Expr::variable("p0"),
        );
        assert_eq!(
            expr_document(&expr).to_string(),
            r#"{"nodeType":"EvalFilter","path":{"nodeType":"PathGet","fieldName":"a","input":{"nodeType":"PathCompare","op":"Eq","value":{"nodeType":"Const","tag":"NumberInt64","value":1}}},"input":{"nodeType":"Variable","name":"p0"}}"#
        );
    }

    #[test]
    fn plan_document() {
        let scan = Abt::new(PhysicalScanNode {
            field_projection_map: FieldProjectionMap::root("p0").with_field("a", "p1"),
            scan_def_name: "coll1".into(),
            scan_order: ScanOrder::Reverse,
        });
        let plan = Abt::new(RootNode {
            projections: vec!["p0".into()],
            child: scan.clone(),
        });
        let mut node_props = NodeToGroupPropsMap::new();
        node_props.insert(&scan, NodeProps::new(1, 2.5, 10.0));

        let options = ExplainOptions::new(ExplainVersion::V3)
            .with_display_properties(true)
            .with_node_props(&node_props);
        assert_eq!(
            StructuredExplainer::new(&options).explain(&plan).to_string(),
            r#"{"nodeType":"Root","projections":["p0"],"child":{"nodeType":"PhysicalScan","properties":{"planNodeId":1,"groupId":0,"cost":2.5,"localCost":0.0,"adjustedCE":10.0},"fieldProjectionMap":{"<root>":"p0","a":"p1"},"scanDefName":"coll1","scanOrder":"Reverse"}}"#
        );

        let options = ExplainOptions::new(ExplainVersion::V3).with_node_props(&node_props);
        let doc = StructuredExplainer::new(&options).explain(&plan);
        let child = doc.get("child").and_then(Value::as_document).unwrap();
        assert!(child.get("properties").is_none());
    }
}
