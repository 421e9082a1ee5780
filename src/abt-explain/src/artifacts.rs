// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Renderers for optimizer artifacts that are not plan nodes: index bounds,
//! partial schema requirements, residual predicates, candidate indexes and
//! property records.
//!
//! Every renderer is a pure function producing a single deterministic line,
//! with expressions printed in their compact form.

use std::fmt::Display;

use itertools::Itertools;
use mz_abt::index_bounds::{
    BoolExpr, BoundRequirement, CandidateIndexEntry, CompoundIntervalReqExpr,
    CompoundIntervalRequirement, IntervalReqExpr, IntervalRequirement, PSRExpr,
    PartialSchemaKey, PartialSchemaRequirement, ResidualRequirements,
};
use mz_abt::props::{LogicalProps, PhysProps};

use crate::text::expr_line;
use crate::tree::PrintTree;

/// Formats `items` as `{a, b, c}`.
pub(crate) fn braced<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    format!("{{{}}}", items.into_iter().join(", "))
}

fn explain_bool_expr<T, F>(expr: &BoolExpr<T>, atom: &F) -> String
where
    F: Fn(&T) -> String,
{
    let (children, separator) = match expr {
        BoolExpr::Atom(a) => return atom(a),
        BoolExpr::Conjunction(children) => (children, " ^ "),
        BoolExpr::Disjunction(children) => (children, " U "),
    };
    match children.as_slice() {
        [only] => explain_bool_expr(only, atom),
        children => format!(
            "({})",
            children
                .iter()
                .map(|child| explain_bool_expr(child, atom))
                .join(separator)
        ),
    }
}

fn explain_bound(bound: &BoundRequirement) -> String {
    expr_line(&bound.bound)
}

/// Renders an interval, using the shorthand forms for equalities and for
/// intervals open on one side.
pub fn explain_interval(interval: &IntervalRequirement) -> String {
    let IntervalRequirement { low, high } = interval;
    if interval.is_fully_open() {
        "{<fully open>}".to_owned()
    } else if interval.is_equality() {
        format!("{{={}}}", explain_bound(low))
    } else if high.is_max_key() {
        let op = if low.inclusive { ">=" } else { ">" };
        format!("{{{}{}}}", op, explain_bound(low))
    } else if low.is_min_key() {
        let op = if high.inclusive { "<=" } else { "<" };
        format!("{{{}{}}}", op, explain_bound(high))
    } else {
        format!(
            "{{{}{}, {}{}}}",
            if low.inclusive { "[" } else { "(" },
            explain_bound(low),
            explain_bound(high),
            if high.inclusive { "]" } else { ")" },
        )
    }
}

pub fn explain_compound_interval(interval: &CompoundIntervalRequirement) -> String {
    braced(interval.0.iter().map(explain_interval))
}

pub fn explain_interval_expr(expr: &IntervalReqExpr) -> String {
    explain_bool_expr(expr, &explain_interval)
}

pub fn explain_compound_interval_expr(expr: &CompoundIntervalReqExpr) -> String {
    explain_bool_expr(expr, &explain_compound_interval)
}

fn requirement_parts(key: &PartialSchemaKey, req: &PartialSchemaRequirement) -> Vec<String> {
    let mut parts = vec![
        key.projection
            .as_ref()
            .map_or_else(|| "<empty>".to_owned(), |p| p.to_string()),
        format!("'{}'", expr_line(&key.path)),
    ];
    if let Some(bound) = &req.bound_projection {
        parts.push(format!("bound: {}", bound));
    }
    parts.push(explain_interval_expr(&req.intervals));
    if req.perf_only {
        parts.push("perfOnly".to_owned());
    }
    parts
}

pub fn explain_partial_schema_req_expr(expr: &PSRExpr) -> String {
    explain_bool_expr(expr, &|(key, req)| braced(requirement_parts(key, req)))
}

pub fn explain_residual_requirements(expr: &ResidualRequirements) -> String {
    explain_bool_expr(expr, &|residual| {
        let mut parts = requirement_parts(&residual.key, &residual.req);
        parts.push(format!("entryIndex: {}", residual.entry_index));
        braced(parts)
    })
}

pub fn explain_candidate_index(entry: &CandidateIndexEntry) -> String {
    let mut line = format!(
        "indexDefName: {}, fieldProjectionMap: {}, intervals: {}, eqPrefixes: [{}]",
        entry.index_def_name,
        entry.field_projection_map,
        explain_compound_interval_expr(&entry.intervals),
        entry.eq_prefixes.iter().join(", "),
    );
    if let Some(residual) = &entry.residual_requirements {
        line.push_str(&format!(
            ", residualReqs: {}",
            explain_residual_requirements(residual)
        ));
    }
    line
}

pub(crate) fn logical_props_tree(label: &str, props: &LogicalProps) -> PrintTree {
    let mut tree = PrintTree::new(label);
    if let Some(ce) = props.cardinality_estimate {
        tree.push_field(PrintTree::new(format!("cardinalityEstimate: {}", ce)));
    }
    if let Some(projections) = &props.projection_availability {
        tree.push_field(PrintTree::new(format!("projections: {}", braced(projections))));
    }
    if let Some(indexing) = &props.indexing_availability {
        let mut parts = vec![
            format!("groupId: {}", indexing.scan_group_id),
            format!("scanProjection: {}", indexing.scan_projection),
            format!("scanDefName: {}", indexing.scan_def_name),
        ];
        if indexing.eq_predicate_only {
            parts.push("eqPredsOnly".to_owned());
        }
        tree.push_field(PrintTree::new(format!(
            "indexingAvailability: [{}]",
            parts.join(", ")
        )));
    }
    if let Some(collections) = &props.collection_availability {
        tree.push_field(PrintTree::new(format!(
            "collectionAvailability: {}",
            braced(collections)
        )));
    }
    tree
}

pub(crate) fn phys_props_tree(label: &str, props: &PhysProps) -> PrintTree {
    let mut tree = PrintTree::new(label);
    if let Some(collation) = &props.collation {
        tree.push_field(PrintTree::new(format!("collation: {}", collation)));
    }
    if let Some(limit_skip) = &props.limit_skip {
        tree.push_field(PrintTree::new(format!("limitSkip: [{}]", limit_skip)));
    }
    if let Some(projections) = &props.projections {
        tree.push_field(PrintTree::new(format!("projections: {}", braced(projections))));
    }
    if let Some(indexing) = &props.indexing {
        let dedup = if indexing.dedup_rid { ", dedupRID" } else { "" };
        tree.push_field(PrintTree::new(format!(
            "indexing: [{}{}]",
            indexing.target, dedup
        )));
    }
    if let Some(estimate) = props.repetition_estimate {
        tree.push_field(PrintTree::new(format!("repetitionEstimate: {}", estimate)));
    }
    if let Some(estimate) = props.limit_estimate {
        tree.push_field(PrintTree::new(format!("limitEstimate: {}", estimate)));
    }
    tree
}

#[cfg(test)]
mod tests {
    use mz_abt::index_bounds::{IndexReqTarget, ResidualRequirement};
    use mz_abt::props::{IndexingAvailability, IndexingRequirement, LimitSkipRequirement};
    use mz_abt::{Datum, Expr, FieldProjectionMap};

    use super::*;

    fn bound(inclusive: bool, i: i64) -> BoundRequirement {
        BoundRequirement::new(inclusive, Expr::int64(i))
    }

    #[test]
    fn interval_shorthands() {
        assert_eq!(
            explain_interval(&IntervalRequirement::fully_open()),
            "{<fully open>}"
        );
        assert_eq!(
            explain_interval(&IntervalRequirement::equals(Expr::int64(1))),
            "{=Const [1]}"
        );
        assert_eq!(
            explain_interval(&IntervalRequirement::new(
                bound(false, 1),
                BoundRequirement::max_key()
            )),
            "{>Const [1]}"
        );
        assert_eq!(
            explain_interval(&IntervalRequirement::new(
                BoundRequirement::min_key(),
                bound(true, 5)
            )),
            "{<=Const [5]}"
        );
        assert_eq!(
            explain_interval(&IntervalRequirement::new(bound(true, 1), bound(false, 5))),
            "{[Const [1], Const [5])}"
        );
        assert_eq!(
            explain_interval(&IntervalRequirement::equals(Expr::constant(Datum::String(
                "x".into()
            )))),
            "{=Const [\"x\"]}"
        );
    }

    #[test]
    fn interval_exprs() {
        let eq = IntervalRequirement::equals(Expr::int64(1));
        assert_eq!(
            explain_interval_expr(&BoolExpr::singular_dnf(eq.clone())),
            "{=Const [1]}"
        );
        let expr = BoolExpr::Disjunction(vec![
            BoolExpr::Conjunction(vec![
                BoolExpr::Atom(eq.clone()),
                BoolExpr::Atom(IntervalRequirement::fully_open()),
            ]),
            BoolExpr::Conjunction(vec![BoolExpr::Atom(eq)]),
        ]);
        assert_eq!(
            explain_interval_expr(&expr),
            "(({=Const [1]} ^ {<fully open>}) U {=Const [1]})"
        );

        let compound = CompoundIntervalRequirement(vec![
            IntervalRequirement::equals(Expr::int64(1)),
            IntervalRequirement::fully_open(),
        ]);
        assert_eq!(
            explain_compound_interval_expr(&BoolExpr::singular_dnf(compound)),
            "{{=Const [1]}, {<fully open>}}"
        );
    }

    fn key_a() -> PartialSchemaKey {
        PartialSchemaKey {
            projection: Some("p0".into()),
            path: Expr::path_get("a", Expr::PathIdentity),
        }
    }

    fn req_eq_1(perf_only: bool) -> PartialSchemaRequirement {
        PartialSchemaRequirement {
            bound_projection: None,
            intervals: BoolExpr::singular_dnf(IntervalRequirement::equals(Expr::int64(1))),
            perf_only,
        }
    }

    #[test]
    fn requirements() {
        let psr = BoolExpr::singular_dnf((key_a(), req_eq_1(false)));
        assert_eq!(
            explain_partial_schema_req_expr(&psr),
            "{p0, 'PathGet [a] PathIdentity []', {=Const [1]}}"
        );

        let mut req = req_eq_1(true);
        req.bound_projection = Some("p1".into());
        let key = PartialSchemaKey {
            projection: None,
            path: Expr::PathIdentity,
        };
        let psr = BoolExpr::singular_dnf((key, req));
        assert_eq!(
            explain_partial_schema_req_expr(&psr),
            "{<empty>, 'PathIdentity []', bound: p1, {=Const [1]}, perfOnly}"
        );

        let residual = BoolExpr::singular_dnf(ResidualRequirement {
            key: key_a(),
            req: req_eq_1(false),
            entry_index: 2,
        });
        assert_eq!(
            explain_residual_requirements(&residual),
            "{p0, 'PathGet [a] PathIdentity []', {=Const [1]}, entryIndex: 2}"
        );
    }

    #[test]
    fn candidate_index() {
        let mut entry = CandidateIndexEntry {
            index_def_name: "idx_a".into(),
            field_projection_map: FieldProjectionMap {
                rid_projection: Some("rid_0".into()),
                ..Default::default()
            },
            intervals: BoolExpr::singular_dnf(CompoundIntervalRequirement(vec![
                IntervalRequirement::equals(Expr::int64(1)),
            ])),
            residual_requirements: None,
            eq_prefixes: vec![0],
        };
        assert_eq!(
            explain_candidate_index(&entry),
            "indexDefName: idx_a, fieldProjectionMap: {'<rid>': rid_0}, \
             intervals: {{=Const [1]}}, eqPrefixes: [0]"
        );

        entry.residual_requirements = Some(BoolExpr::Atom(ResidualRequirement {
            key: key_a(),
            req: req_eq_1(false),
            entry_index: 0,
        }));
        let residual =
            ", residualReqs: {p0, 'PathGet [a] PathIdentity []', {=Const [1]}, entryIndex: 0}";
        assert!(explain_candidate_index(&entry).ends_with(residual));
    }

    #[test]
    fn property_trees() {
        let logical = LogicalProps {
            cardinality_estimate: Some(100.0),
            projection_availability: Some(["p1".into(), "p0".into()].into_iter().collect()),
            indexing_availability: Some(IndexingAvailability {
                scan_group_id: 0,
                scan_projection: "p0".into(),
                scan_def_name: "coll1".into(),
                eq_predicate_only: true,
            }),
            collection_availability: Some(["coll1".to_string()].into_iter().collect()),
        };
        assert_eq!(
            logical_props_tree("logical:", &logical).into_text(),
            "logical:\n\
             |   cardinalityEstimate: 100\n\
             |   projections: {p0, p1}\n\
             |   indexingAvailability: [groupId: 0, scanProjection: p0, scanDefName: coll1, eqPredsOnly]\n\
             |   collectionAvailability: {coll1}\n"
        );

        let physical = PhysProps {
            limit_skip: Some(LimitSkipRequirement::new(10, 0)),
            indexing: Some(IndexingRequirement {
                target: IndexReqTarget::Complete,
                dedup_rid: true,
            }),
            ..Default::default()
        };
        assert_eq!(
            phys_props_tree("physical:", &physical).into_text(),
            "physical:\n\
             |   limitSkip: [limit: 10, skip: 0]\n\
             |   indexing: [Complete, dedupRID]\n"
        );
        assert!(!phys_props_tree("physical:", &PhysProps::default()).has_fields());
    }
}
