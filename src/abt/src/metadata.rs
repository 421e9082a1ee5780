// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Catalog information about the collections and indexes a plan reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::props::CollationOp;

/// One component of an index key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCollationEntry {
    /// The dotted field path, split into its components.
    pub path: Vec<String>,
    pub op: CollationOp,
}

impl IndexCollationEntry {
    pub fn new(path: &str, op: CollationOp) -> IndexCollationEntry {
        IndexCollationEntry {
            path: path.split('.').map(str::to_owned).collect(),
            op,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub collation_spec: Vec<IndexCollationEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDefinition {
    pub options: BTreeMap<String, String>,
    pub index_defs: BTreeMap<String, IndexDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub scan_defs: BTreeMap<String, ScanDefinition>,
}

impl Metadata {
    pub fn index_def(&self, scan_def_name: &str, index_def_name: &str) -> Option<&IndexDefinition> {
        self.scan_defs
            .get(scan_def_name)
            .and_then(|scan_def| scan_def.index_defs.get(index_def_name))
    }
}
