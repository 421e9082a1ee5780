// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A one-line synopsis of how a plan accesses its collections.

use itertools::Itertools;
use mz_abt::metadata::{IndexDefinition, Metadata};
use mz_abt::props::CollationOp;
use mz_abt::{Abt, IndexScanNode, Node};

fn key_pattern(index: &IndexDefinition) -> String {
    let fields = index
        .collation_spec
        .iter()
        .map(|entry| {
            let direction = match entry.op {
                CollationOp::Descending => -1,
                CollationOp::Ascending | CollationOp::Clustered => 1,
            };
            format!("{}: {}", entry.path.join("."), direction)
        })
        .join(", ");
    format!("{{ {} }}", fields)
}

fn index_scan_summary(scan: &IndexScanNode, metadata: &Metadata) -> String {
    match metadata.index_def(&scan.scan_def_name, &scan.index_def_name) {
        Some(index) => format!("IXSCAN {}", key_pattern(index)),
        None => format!("IXSCAN {}", scan.index_def_name),
    }
}

/// Summarizes the access paths of `node`: `COLLSCAN` for collection scans
/// and `IXSCAN` with the index's key pattern for index scans, in pre-order
/// and without repetitions. A plan that reads no collection is `EOF`.
pub fn plan_summary(node: &Abt, metadata: &Metadata) -> String {
    let mut stages = vec![];
    node.visit_pre(&mut |n| match n.node() {
        Node::PhysicalScan(_) => stages.push("COLLSCAN".to_owned()),
        Node::IndexScan(scan) => stages.push(index_scan_summary(scan, metadata)),
        _ => {}
    });

    if stages.is_empty() {
        "EOF".to_owned()
    } else {
        stages.into_iter().unique().join(", ")
    }
}
