// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Entry points for explaining plans, memos and property records.
//!
//! Every function is a pure transformation of its arguments. The property
//! table and the memo are only read.

use mz_abt::memo::MemoExplainInterface;
use mz_abt::props::{LogicalProps, PhysProps};
use mz_abt::{Abt, NodeToGroupPropsMap};

use crate::artifacts::{logical_props_tree, phys_props_tree};
use crate::config::{ExplainOptions, ExplainVersion};
use crate::document::{Document, TypeTag, Value};
use crate::error::ExplainError;
use crate::structured::StructuredExplainer;
use crate::text::{node_header, TextExplainer};
use crate::user_facing::UserFacingExplain;

/// Explains `node` in the dialect selected by `options`.
///
/// The text dialects return their indented text. `V3` and `UserFacing`
/// return the JSON form of [`explain_document`].
#[tracing::instrument(level = "debug", skip_all, fields(version = %options.version))]
pub fn explain(node: &Abt, options: &ExplainOptions<'_>) -> Result<String, ExplainError> {
    if options.version.is_text() {
        Ok(TextExplainer::new(options).explain(node))
    } else {
        explain_document(node, options)?.to_json_string()
    }
}

fn explain_text(
    version: ExplainVersion,
    node: &Abt,
    display_properties: bool,
    memo: Option<&dyn MemoExplainInterface>,
    node_props: &NodeToGroupPropsMap,
) -> String {
    let mut options = ExplainOptions::new(version)
        .with_display_properties(display_properties)
        .with_node_props(node_props);
    options.memo = memo;
    TextExplainer::new(&options).explain(node)
}

pub fn explain_v1(
    node: &Abt,
    display_properties: bool,
    memo: Option<&dyn MemoExplainInterface>,
    node_props: &NodeToGroupPropsMap,
) -> String {
    explain_text(ExplainVersion::V1, node, display_properties, memo, node_props)
}

pub fn explain_v2(
    node: &Abt,
    display_properties: bool,
    memo: Option<&dyn MemoExplainInterface>,
    node_props: &NodeToGroupPropsMap,
) -> String {
    explain_text(ExplainVersion::V2, node, display_properties, memo, node_props)
}

pub fn explain_v2_compact(
    node: &Abt,
    display_properties: bool,
    memo: Option<&dyn MemoExplainInterface>,
    node_props: &NodeToGroupPropsMap,
) -> String {
    explain_text(ExplainVersion::V2Compact, node, display_properties, memo, node_props)
}

/// Renders `node` alone, without its inputs and without annotations.
pub fn explain_node(node: &Abt) -> String {
    node_header(node.node())
}

/// Explains `node` as a document.
///
/// Text dialects are wrapped as `{"plan": <text>}`.
#[tracing::instrument(level = "debug", skip_all, fields(version = %options.version))]
pub fn explain_document(
    node: &Abt,
    options: &ExplainOptions<'_>,
) -> Result<Document, ExplainError> {
    match options.version {
        ExplainVersion::V1 | ExplainVersion::V2 | ExplainVersion::V2Compact => {
            let mut doc = Document::new();
            doc.append("plan", TextExplainer::new(options).explain(node));
            Ok(doc)
        }
        ExplainVersion::V3 => Ok(StructuredExplainer::new(options).explain(node)),
        ExplainVersion::UserFacing => UserFacingExplain::new(options.node_props).explain(node),
    }
}

/// The JSON form of [`explain_document`].
pub fn explain_document_str(
    node: &Abt,
    options: &ExplainOptions<'_>,
) -> Result<String, ExplainError> {
    explain_document(node, options)?.to_json_string()
}

/// [`explain_document`] as a typed value.
pub fn explain_value(
    node: &Abt,
    options: &ExplainOptions<'_>,
) -> Result<(TypeTag, Value), ExplainError> {
    let value = Value::from(explain_document(node, options)?);
    Ok((value.type_tag(), value))
}

pub fn explain_logical_props(description: &str, props: &LogicalProps) -> String {
    logical_props_tree(description, props).into_text()
}

pub fn explain_phys_props(description: &str, props: &PhysProps) -> String {
    phys_props_tree(description, props).into_text()
}

/// Explains every group of `memo`.
#[tracing::instrument(level = "debug", skip_all, fields(groups = memo.group_count()))]
pub fn explain_memo(memo: &dyn MemoExplainInterface) -> String {
    crate::memo::explain_memo_text(memo)
}

pub fn explain_memo_document(memo: &dyn MemoExplainInterface) -> Document {
    crate::memo::explain_memo_document(memo)
}

pub fn explain_memo_value(memo: &dyn MemoExplainInterface) -> (TypeTag, Value) {
    let value = Value::from(explain_memo_document(memo));
    (value.type_tag(), value)
}

#[cfg(test)]
mod tests {
    use mz_abt::props::NodeProps;
    use mz_abt::{FieldProjectionMap, PhysicalScanNode, RootNode, ScanOrder};

    use super::*;

    fn plan() -> (Abt, NodeToGroupPropsMap) {
        let scan = Abt::new(PhysicalScanNode {
            field_projection_map: FieldProjectionMap::root("p0"),
            scan_def_name: "coll1".into(),
            scan_order: ScanOrder::Forward,
        });
        let root = Abt::new(RootNode {
            projections: vec!["p0".into()],
            child: scan.clone(),
        });
        let mut map = NodeToGroupPropsMap::new();
        map.insert(&root, NodeProps::new(0, 1.0, 10.0));
        map.insert(&scan, NodeProps::new(1, 1.0, 10.0));
        (root, map)
    }

    #[test]
    fn document_and_string_forms_agree() {
        let (root, map) = plan();
        for version in [ExplainVersion::V3, ExplainVersion::UserFacing] {
            let options = ExplainOptions::new(version).with_node_props(&map);
            assert_eq!(
                explain(&root, &options).unwrap(),
                explain_document_str(&root, &options).unwrap()
            );
        }
        for version in [ExplainVersion::V1, ExplainVersion::V2, ExplainVersion::V2Compact] {
            let options = ExplainOptions::new(version).with_node_props(&map);
            let doc = explain_document(&root, &options).unwrap();
            assert_eq!(
                doc.get("plan").and_then(Value::as_str),
                Some(explain(&root, &options).unwrap().as_str())
            );
        }
    }

    #[test]
    fn text_shortcuts() {
        let (root, map) = plan();
        assert_eq!(
            explain_v2(&root, false, None, &map),
            "Root [{p0}]\nPhysicalScan [{'<root>': p0}, coll1, Forward]\n"
        );
        assert_eq!(
            explain_v2_compact(&root, false, None, &map),
            explain_v2(&root, false, None, &map)
        );
        assert!(explain_v1(&root, true, None, &map).contains(
            "|   Properties [planNodeId: 1, groupId: 0, cost: 1, localCost: 0, adjustedCE: 10]"
        ));
        assert_eq!(explain_node(&root), "Root [{p0}]");
    }

    #[test]
    fn typed_values() {
        let (root, map) = plan();
        let options = ExplainOptions::new(ExplainVersion::UserFacing).with_node_props(&map);
        let (tag, value) = explain_value(&root, &options).unwrap();
        assert_eq!(tag, TypeTag::Object);
        assert_eq!(
            value.as_document().and_then(|d| d.get("stage")).and_then(Value::as_str),
            Some("ROOT")
        );

        let (tag, _) = explain_memo_value(&mz_abt::memo::Memo::new());
        assert_eq!(tag, TypeTag::Object);
    }

    #[test]
    fn property_records() {
        let props = LogicalProps {
            cardinality_estimate: Some(5.0),
            ..Default::default()
        };
        assert_eq!(
            explain_logical_props("Logical properties:", &props),
            "Logical properties:\n|   cardinalityEstimate: 5\n"
        );
        assert_eq!(
            explain_phys_props("Physical properties:", &PhysProps::default()),
            "Physical properties:\n"
        );
    }
}
