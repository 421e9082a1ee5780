// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeSet, HashMap};

use mz_abt::memo::{Group, Memo, PhysicalEntry, PhysicalNodeInfo};
use mz_abt::metadata::Metadata;
use mz_abt::props::{LimitSkipRequirement, LogicalProps, NodeProps, PhysProps};
use mz_abt::{
    Abt, CoScanNode, Datum, EvaluationNode, Expr, FieldProjectionMap, FilterNode, JoinType,
    LimitSkipNode, MemoLogicalDelegatorNode, MemoPhysicalDelegatorNode, NestedLoopJoinNode,
    NodeToGroupPropsMap, Operations, PhysicalScanNode, RootNode, ScanOrder, UnionNode,
};
use mz_abt_explain::{explain, plan_summary, ExplainConfig};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn collscan(order: ScanOrder) -> Abt {
    Abt::new(PhysicalScanNode {
        field_projection_map: FieldProjectionMap::root("p0"),
        scan_def_name: "coll1".into(),
        scan_order: order,
    })
}

fn root(child: Abt) -> Abt {
    Abt::new(RootNode {
        projections: vec!["p0".into()],
        child,
    })
}

fn props(
    plan_node_id: i32,
    group_id: usize,
    cost: f64,
    local_cost: f64,
    adjusted_ce: f64,
) -> NodeProps {
    NodeProps {
        plan_node_id,
        group_id,
        cost,
        local_cost,
        adjusted_ce,
        ..Default::default()
    }
}

/// A memo with a single group: one logical and one physical alternative.
fn delegate_memo() -> Memo {
    let mut memo = Memo::new();
    memo.add_group(Group {
        logical_nodes: vec![collscan(ScanOrder::Forward)],
        logical_props: LogicalProps {
            cardinality_estimate: Some(42.0),
            ..Default::default()
        },
        physical_nodes: vec![PhysicalEntry {
            props: PhysProps {
                limit_skip: Some(LimitSkipRequirement::new(7, 3)),
                ..Default::default()
            },
            cost_limit: Some(100.0),
            node_info: Some(PhysicalNodeInfo {
                node: collscan(ScanOrder::Forward),
                cost: 4.5,
                local_cost: 4.5,
                adjusted_ce: 42.0,
            }),
        }],
    });
    memo
}

/// A named plan with its annotations and, for plans that delegate to one,
/// its memo.
fn fixture(name: &str) -> Option<(Abt, NodeToGroupPropsMap, Option<Memo>)> {
    let mut map = NodeToGroupPropsMap::new();
    let mut memo = None;
    let plan = match name {
        "scan" => {
            let scan = collscan(ScanOrder::Forward);
            let plan = root(scan.clone());
            map.insert(&plan, props(0, 1, 10.0, 0.0, 100.0));
            map.insert(&scan, props(1, 0, 10.0, 10.0, 100.0));
            plan
        }
        "filter" => {
            let scan = collscan(ScanOrder::Forward);
            let filter = Abt::new(FilterNode {
                filter: Expr::eval_filter(
                    Expr::path_get(
                        "a",
                        Expr::path_traverse(
                            Some(1),
                            Expr::path_compare(Operations::Eq, Expr::int64(1)),
                        ),
                    ),
                    Expr::variable("p0"),
                ),
                child: scan.clone(),
            });
            let plan = root(filter.clone());
            map.insert(&plan, props(0, 2, 25.5, 0.0, 10.0));
            map.insert(&filter, props(2, 1, 25.5, 5.5, 10.0));
            map.insert(
                &scan,
                NodeProps {
                    logical_props: LogicalProps {
                        cardinality_estimate: Some(100.0),
                        ..Default::default()
                    },
                    physical_props: PhysProps {
                        projections: Some(vec!["p0".into()]),
                        ..Default::default()
                    },
                    ..props(1, 0, 20.0, 20.0, 100.0)
                },
            );
            plan
        }
        "eof" => {
            let plan = root(Abt::new(EvaluationNode {
                projection: "p0".into(),
                expr: Expr::nothing(),
                child: Abt::new(LimitSkipNode {
                    requirement: LimitSkipRequirement::new(0, 0),
                    child: Abt::new(CoScanNode),
                }),
            }));
            map.insert(&plan, props(5, 0, 0.0, 0.0, 0.0));
            plan
        }
        "union" => {
            let plan = root(Abt::new(UnionNode {
                projections: vec!["p0".into()],
                children: vec![collscan(ScanOrder::Forward), collscan(ScanOrder::Reverse)],
            }));
            let mut next_id = 0;
            plan.visit_pre(&mut |n| {
                map.insert(n, props(next_id, 0, 1.0, 1.0, 1.0));
                next_id += 1;
            });
            plan
        }
        "memo_delegators" => {
            memo = Some(delegate_memo());
            Abt::new(NestedLoopJoinNode {
                join_type: JoinType::Inner,
                correlated_projections: BTreeSet::new(),
                filter: Expr::constant(Datum::Boolean(true)),
                left: Abt::new(MemoLogicalDelegatorNode { group_id: 0 }),
                right: Abt::new(MemoPhysicalDelegatorNode {
                    group_id: 0,
                    index: 0,
                }),
            })
        }
        _ => return None,
    };
    Some((plan, map, memo))
}

fn handle_explain(args: &HashMap<String, Vec<String>>) -> String {
    let Some((plan, map, memo)) = args.get("plan").and_then(|p| fixture(&p[0])) else {
        return "missing or unknown `plan` argument\n".to_string();
    };
    let with = args
        .get("with")
        .map(|with| with.iter().cloned().collect::<BTreeSet<String>>())
        .unwrap_or_default();
    let config = match ExplainConfig::try_from(with) {
        Ok(config) => config,
        Err(e) => return format!("error: {}\n", e),
    };

    let empty = NodeToGroupPropsMap::new();
    let node_props = if args.contains_key("no_props") {
        &empty
    } else {
        &map
    };
    let mut options = config.options(node_props);
    if let (Some(memo), false) = (&memo, args.contains_key("no_memo")) {
        options = options.with_memo(memo);
    }
    match explain(&plan, &options) {
        Ok(text) if text.ends_with('\n') => text,
        Ok(text) => format!("{}\n", text),
        Err(e) => match e.code() {
            Some(code) => format!("error: {} (code {})\n", e, code),
            None => format!("error: {}\n", e),
        },
    }
}

fn handle_summary(args: &HashMap<String, Vec<String>>) -> String {
    match args.get("plan").and_then(|p| fixture(&p[0])) {
        Some((plan, _, _)) => format!("{}\n", plan_summary(&plan, &Metadata::default())),
        None => "missing or unknown `plan` argument\n".to_string(),
    }
}

#[test]
fn run_tests() {
    init_logging();
    datadriven::walk("tests/testdata", |f| {
        f.run(|test_case| -> String {
            match test_case.directive.as_str() {
                "explain" => handle_explain(&test_case.args),
                "summary" => handle_summary(&test_case.args),
                _ => format!("unknown directive: {}\n", test_case.directive),
            }
        })
    });
}
