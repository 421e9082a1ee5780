// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Properties of the user-facing dialect over randomly generated linear
//! plans: `Root` over any chain of `Filter` and `Evaluation` nodes over a
//! `PhysicalScan`.

use mz_abt::props::NodeProps;
use mz_abt::{
    Abt, EvaluationNode, Expr, FieldProjectionMap, FilterNode, Node, NodeToGroupPropsMap,
    Operations, PhysicalScanNode, RootNode, ScanOrder,
};
use mz_abt_explain::user_facing::tokens;
use mz_abt_explain::{
    explain, explain_document, explain_document_str, Document, ExplainError, ExplainOptions,
    ExplainVersion, Value,
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Stage {
    Filter(i64),
    Evaluation(i64),
}

fn arb_scan_order() -> impl Strategy<Value = ScanOrder> {
    prop_oneof![
        Just(ScanOrder::Forward),
        Just(ScanOrder::Reverse),
        Just(ScanOrder::Random),
    ]
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        any::<i64>().prop_map(Stage::Filter),
        any::<i64>().prop_map(Stage::Evaluation),
    ]
}

/// Builds the plan bottom-up from `stages` and annotates every node, in
/// pre-order, with ids `0..n` and costs derived from them.
fn build(order: ScanOrder, stages: &[Stage]) -> (Abt, NodeToGroupPropsMap) {
    let mut plan = Abt::new(PhysicalScanNode {
        field_projection_map: FieldProjectionMap::root("p0"),
        scan_def_name: "coll1".into(),
        scan_order: order,
    });
    for (i, stage) in stages.iter().enumerate() {
        plan = match stage {
            Stage::Filter(c) => Abt::new(FilterNode {
                filter: Expr::eval_filter(
                    Expr::path_compare(Operations::Gt, Expr::int64(*c)),
                    Expr::variable("p0"),
                ),
                child: plan,
            }),
            Stage::Evaluation(c) => Abt::new(EvaluationNode {
                projection: format!("p{}", i + 1).into(),
                expr: Expr::binary(Operations::Add, Expr::variable("p0"), Expr::int64(*c)),
                child: plan,
            }),
        };
    }
    let plan = Abt::new(RootNode {
        projections: vec!["p0".into()],
        child: plan,
    });

    let mut map = NodeToGroupPropsMap::new();
    let mut next_id = 0;
    plan.visit_pre(&mut |node| {
        map.insert(node, NodeProps::new(next_id, f64::from(next_id) + 0.5, 10.0));
        next_id += 1;
    });
    (plan, map)
}

fn nodes(plan: &Abt) -> Vec<Abt> {
    let mut nodes = vec![];
    plan.visit_pre(&mut |node| nodes.push(node.clone()));
    nodes
}

fn expected_stage(node: &Abt) -> &'static str {
    match node.node() {
        Node::Root(_) => tokens::ROOT_STAGE,
        Node::Filter(_) => tokens::FILTER_STAGE,
        Node::Evaluation(_) => tokens::EVALUATION_STAGE,
        Node::PhysicalScan(_) => tokens::COLLSCAN_STAGE,
        other => panic!("unexpected node {}", other.name()),
    }
}

fn input_stages(doc: &Document) -> Vec<&Document> {
    let mut levels = vec![doc];
    let mut current = doc;
    while let Some(next) = current.get(tokens::INPUT_STAGE).and_then(Value::as_document) {
        levels.push(next);
        current = next;
    }
    levels
}

#[test]
#[cfg_attr(miri, ignore)] // too slow
fn explain_is_idempotent() {
    proptest!(|(order in arb_scan_order(), stages in prop::collection::vec(arb_stage(), 0..8))| {
        let (plan, map) = build(order, &stages);
        for version in ExplainVersion::ALL {
            let options = ExplainOptions::new(version)
                .with_display_properties(true)
                .with_node_props(&map);
            let first = explain(&plan, &options).unwrap();
            let second = explain(&plan, &options).unwrap();
            prop_assert_eq!(first, second);
        }
    });
}

#[test]
#[cfg_attr(miri, ignore)] // too slow
fn stages_follow_the_plan() {
    proptest!(|(order in arb_scan_order(), stages in prop::collection::vec(arb_stage(), 0..8))| {
        let (plan, map) = build(order, &stages);
        let options = ExplainOptions::new(ExplainVersion::UserFacing).with_node_props(&map);
        let doc = explain_document(&plan, &options).unwrap();

        let nodes = nodes(&plan);
        let levels = input_stages(&doc);
        prop_assert_eq!(levels.len(), stages.len() + 2);
        prop_assert_eq!(levels.len(), nodes.len());

        for (node, level) in nodes.iter().zip(levels) {
            let props = map.find(node).unwrap();
            prop_assert_eq!(
                level.get(tokens::STAGE).and_then(Value::as_str),
                Some(expected_stage(node))
            );
            prop_assert_eq!(
                level.get(tokens::CARDINALITY_ESTIMATE).and_then(Value::as_f64),
                Some(props.adjusted_ce)
            );
            if let Node::Root(_) = node.node() {
                prop_assert!(level.get(tokens::PLAN_NODE_ID).is_none());
                prop_assert_eq!(
                    level.get(tokens::COST_ESTIMATE).and_then(Value::as_f64),
                    Some(props.cost)
                );
            } else {
                prop_assert_eq!(
                    level.get(tokens::PLAN_NODE_ID).and_then(Value::as_i64),
                    Some(i64::from(props.plan_node_id))
                );
            }
        }

        // The document and string forms agree.
        prop_assert_eq!(
            explain(&plan, &options).unwrap(),
            explain_document_str(&plan, &options).unwrap()
        );
    });
}

#[test]
#[cfg_attr(miri, ignore)] // too slow
fn missing_entries_fail() {
    let strategy = (arb_scan_order(), prop::collection::vec(arb_stage(), 0..8))
        .prop_flat_map(|(order, stages)| {
            let size = stages.len() + 2;
            (Just(order), Just(stages), 0..size)
        });
    proptest!(|((order, stages, victim) in strategy)| {
        let (plan, mut map) = build(order, &stages);
        let node = nodes(&plan).swap_remove(victim);
        map.remove(&node);

        let options = ExplainOptions::new(ExplainVersion::UserFacing).with_node_props(&map);
        let err = explain(&plan, &options).unwrap_err();
        prop_assert_eq!(err.code(), Some(ExplainError::MISSING_NODE_PROPERTIES));
        let is_missing_node = matches!(
            err,
            ExplainError::MissingNodeProperties { node: name } if name == node.node().name()
        );
        prop_assert!(is_missing_node);
    });
}

#[test]
fn random_scan_under_root() {
    let (plan, mut map) = build(ScanOrder::Random, &[]);
    let scan = plan.children()[0].clone();
    map.insert(&plan, NodeProps::new(0, 12.5, 1.0));
    map.insert(&scan, NodeProps::new(7, 12.5, 1.0));

    let options = ExplainOptions::new(ExplainVersion::UserFacing).with_node_props(&map);
    let doc = explain_document(&plan, &options).unwrap();
    assert_eq!(doc.get("stage").and_then(Value::as_str), Some("ROOT"));
    assert_eq!(doc.get("costEstimate").and_then(Value::as_f64), Some(12.5));

    let input = doc.get("inputStage").and_then(Value::as_document).unwrap();
    assert_eq!(input.get("stage").and_then(Value::as_str), Some("COLLSCAN"));
    assert_eq!(input.get("planNodeId").and_then(Value::as_i64), Some(7));
    assert_eq!(input.get("direction").and_then(Value::as_str), Some("random"));
}
