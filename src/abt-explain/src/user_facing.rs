// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The user-facing explain dialect.
//!
//! A finalized physical plan is rendered as nested execution stages, each
//! annotated with the plan node id, cost and cardinality the optimizer
//! recorded for it. The field names are consumed by downstream tooling and
//! must not change.

use mz_abt::props::{LimitSkipRequirement, NodeProps};
use mz_abt::{
    Abt, CoScanNode, EvaluationNode, FilterNode, LimitSkipNode, Node, NodeToGroupPropsMap,
    PhysicalScanNode, RootNode,
};
use once_cell::sync::Lazy;

use crate::document::{Document, Value};
use crate::error::ExplainError;
use crate::structured::field_projection_map_document;
use crate::text::expr_line;

/// Field names and values of the user-facing documents.
pub mod tokens {
    use mz_abt::ScanOrder;

    pub const STAGE: &str = "stage";
    pub const PLAN_NODE_ID: &str = "planNodeId";
    pub const PROJECTIONS: &str = "projections";
    pub const CARDINALITY_ESTIMATE: &str = "cardinalityEstimate";
    pub const COST_ESTIMATE: &str = "costEstimate";
    pub const INPUT_STAGE: &str = "inputStage";
    pub const FILTER: &str = "filter";
    pub const DIRECTION: &str = "direction";

    pub const ROOT_STAGE: &str = "ROOT";
    pub const FILTER_STAGE: &str = "FILTER";
    pub const EVALUATION_STAGE: &str = "EVALUATION";
    pub const COLLSCAN_STAGE: &str = "COLLSCAN";
    pub const EOF_STAGE: &str = "EOF";

    pub fn direction(scan_order: ScanOrder) -> &'static str {
        match scan_order {
            ScanOrder::Forward => "forward",
            ScanOrder::Reverse => "backward",
            ScanOrder::Random => "random",
        }
    }
}

/// The shape under an `Evaluation` that the optimizer produces for a
/// collection known to be empty.
static EOF_TAIL: Lazy<Abt> = Lazy::new(|| {
    Abt::new(LimitSkipNode {
        requirement: LimitSkipRequirement::new(0, 0),
        child: Abt::new(CoScanNode),
    })
});

/// Renders finalized physical plans as user-facing documents.
#[derive(Clone, Copy, Debug)]
pub struct UserFacingExplain<'a> {
    node_map: &'a NodeToGroupPropsMap,
}

impl<'a> UserFacingExplain<'a> {
    pub fn new(node_map: &'a NodeToGroupPropsMap) -> UserFacingExplain<'a> {
        UserFacingExplain { node_map }
    }

    /// Explains the plan rooted at `node`.
    ///
    /// Every node of a plan that is not recognized as empty must be one of
    /// the supported stages and must have an entry in the property table.
    pub fn explain(&self, node: &Abt) -> Result<Document, ExplainError> {
        if Self::is_eof_plan(node) {
            tracing::debug!("plan is known to be empty, explaining as {}", tokens::EOF_STAGE);
            return self.generate_eof_plan(node);
        }

        let mut doc = Document::new();
        self.generate_explain(node, &mut doc)?;
        if doc.is_empty() {
            let err = ExplainError::EmptyPlan;
            tracing::error!(code = err.code(), "{}", err);
            return Err(err);
        }
        Ok(doc)
    }

    /// Returns `true` iff `node` is a root over `Evaluation(Nothing)` over
    /// `LimitSkip(0, 0)` over `CoScan`, the optimizer's encoding of a plan
    /// that cannot return any rows.
    pub fn is_eof_plan(node: &Abt) -> bool {
        let Node::Root(RootNode { child, .. }) = node.node() else {
            return false;
        };
        let Node::Evaluation(EvaluationNode { expr, child, .. }) = child.node() else {
            return false;
        };
        expr.is_nothing() && *child == *EOF_TAIL
    }

    fn generate_eof_plan(&self, node: &Abt) -> Result<Document, ExplainError> {
        let props = self.node_props(node)?;
        let mut doc = Document::new();
        doc.append(tokens::STAGE, tokens::EOF_STAGE)
            .append(tokens::PLAN_NODE_ID, props.plan_node_id);
        Ok(doc)
    }

    fn node_props(&self, node: &Abt) -> Result<&'a NodeProps, ExplainError> {
        self.node_map.find(node).ok_or_else(|| {
            let err = ExplainError::MissingNodeProperties {
                node: node.node().name(),
            };
            tracing::error!(code = err.code(), handle = %node.handle(), "{}", err);
            err
        })
    }

    fn generate_explain(&self, node: &Abt, doc: &mut Document) -> Result<(), ExplainError> {
        match node.node() {
            Node::Root(root) => self.explain_root(node, root, doc),
            Node::Filter(filter) => self.explain_filter(node, filter, doc),
            Node::Evaluation(eval) => self.explain_evaluation(node, eval, doc),
            Node::PhysicalScan(scan) => self.explain_physical_scan(node, scan, doc),
            Node::Scan(_)
            | Node::IndexScan(_)
            | Node::Seek(_)
            | Node::LimitSkip(_)
            | Node::CoScan(_)
            | Node::Collation(_)
            | Node::Union(_)
            | Node::NestedLoopJoin(_)
            | Node::Sargable(_)
            | Node::MemoLogicalDelegator(_)
            | Node::MemoPhysicalDelegator(_) => {
                let err = ExplainError::UnsupportedNode {
                    node: node.node().name(),
                };
                tracing::error!(code = err.code(), "{}", err);
                Err(err)
            }
        }
    }

    fn explain_root(
        &self,
        node: &Abt,
        root: &RootNode,
        doc: &mut Document,
    ) -> Result<(), ExplainError> {
        let props = self.node_props(node)?;
        let projections: Vec<Value> = root
            .projections
            .iter()
            .map(|p| Value::from(p.as_str()))
            .collect();
        doc.append(tokens::STAGE, tokens::ROOT_STAGE)
            .append(tokens::PROJECTIONS, projections)
            .append(tokens::CARDINALITY_ESTIMATE, props.adjusted_ce)
            .append(tokens::COST_ESTIMATE, props.cost);
        self.generate_explain(&root.child, doc.subdocument(tokens::INPUT_STAGE))
    }

    fn explain_filter(
        &self,
        node: &Abt,
        filter: &FilterNode,
        doc: &mut Document,
    ) -> Result<(), ExplainError> {
        let props = self.node_props(node)?;
        doc.append(tokens::STAGE, tokens::FILTER_STAGE)
            .append(tokens::PLAN_NODE_ID, props.plan_node_id)
            .append(tokens::FILTER, expr_line(&filter.filter))
            .append(tokens::CARDINALITY_ESTIMATE, props.adjusted_ce);
        self.generate_explain(&filter.child, doc.subdocument(tokens::INPUT_STAGE))
    }

    fn explain_evaluation(
        &self,
        node: &Abt,
        eval: &EvaluationNode,
        doc: &mut Document,
    ) -> Result<(), ExplainError> {
        let props = self.node_props(node)?;
        let mut projections = Document::new();
        projections.append(eval.projection.as_str(), expr_line(&eval.expr));
        doc.append(tokens::STAGE, tokens::EVALUATION_STAGE)
            .append(tokens::PLAN_NODE_ID, props.plan_node_id)
            .append(tokens::PROJECTIONS, projections)
            .append(tokens::CARDINALITY_ESTIMATE, props.adjusted_ce);
        self.generate_explain(&eval.child, doc.subdocument(tokens::INPUT_STAGE))
    }

    fn explain_physical_scan(
        &self,
        node: &Abt,
        scan: &PhysicalScanNode,
        doc: &mut Document,
    ) -> Result<(), ExplainError> {
        let props = self.node_props(node)?;
        doc.append(tokens::STAGE, tokens::COLLSCAN_STAGE)
            .append(tokens::PLAN_NODE_ID, props.plan_node_id)
            .append(tokens::DIRECTION, tokens::direction(scan.scan_order))
            .append(
                tokens::PROJECTIONS,
                field_projection_map_document(&scan.field_projection_map),
            )
            .append(tokens::CARDINALITY_ESTIMATE, props.adjusted_ce);
        Ok(())
    }
}
