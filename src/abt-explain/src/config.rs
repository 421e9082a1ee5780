// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Explain versions, per-call options and the `WITH (...)` configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use mz_abt::memo::MemoExplainInterface;
use mz_abt::NodeToGroupPropsMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ExplainError;

/// An output dialect. Versions are alternatives, not refinements of each
/// other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainVersion {
    V1,
    V2,
    #[serde(rename = "v2compact")]
    V2Compact,
    #[default]
    V3,
    UserFacing,
}

impl ExplainVersion {
    pub const ALL: [ExplainVersion; 5] = [
        ExplainVersion::V1,
        ExplainVersion::V2,
        ExplainVersion::V2Compact,
        ExplainVersion::V3,
        ExplainVersion::UserFacing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExplainVersion::V1 => "v1",
            ExplainVersion::V2 => "v2",
            ExplainVersion::V2Compact => "v2compact",
            ExplainVersion::V3 => "v3",
            ExplainVersion::UserFacing => "user_facing",
        }
    }

    /// Whether this version renders to indented text rather than a document.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ExplainVersion::V1 | ExplainVersion::V2 | ExplainVersion::V2Compact
        )
    }
}

impl fmt::Display for ExplainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExplainVersion {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExplainVersion::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExplainError::UnknownVersion(s.to_owned()))
    }
}

static EMPTY_NODE_PROPS: Lazy<NodeToGroupPropsMap> = Lazy::new(NodeToGroupPropsMap::new);

/// Everything a single explain call needs besides the plan.
///
/// The memo and the property table are borrowed: both are owned by the
/// optimizer and may outlive many explain calls.
#[derive(Clone, Copy)]
pub struct ExplainOptions<'a> {
    pub version: ExplainVersion,
    pub display_properties: bool,
    pub memo: Option<&'a dyn MemoExplainInterface>,
    pub node_props: &'a NodeToGroupPropsMap,
}

impl<'a> ExplainOptions<'a> {
    pub fn new(version: ExplainVersion) -> ExplainOptions<'a> {
        ExplainOptions {
            version,
            display_properties: false,
            memo: None,
            node_props: &EMPTY_NODE_PROPS,
        }
    }

    pub fn with_display_properties(mut self, display_properties: bool) -> ExplainOptions<'a> {
        self.display_properties = display_properties;
        self
    }

    pub fn with_memo(mut self, memo: &'a dyn MemoExplainInterface) -> ExplainOptions<'a> {
        self.memo = Some(memo);
        self
    }

    pub fn with_node_props(mut self, node_props: &'a NodeToGroupPropsMap) -> ExplainOptions<'a> {
        self.node_props = node_props;
        self
    }
}

impl fmt::Debug for ExplainOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplainOptions")
            .field("version", &self.version)
            .field("display_properties", &self.display_properties)
            .field("memo", &self.memo.map(|m| m.group_count()))
            .field("node_props", &self.node_props.len())
            .finish()
    }
}

/// Explain configuration as it appears in `EXPLAIN ... WITH (...)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub version: ExplainVersion,
    pub display_properties: bool,
}

impl ExplainConfig {
    pub fn options<'a>(&self, node_props: &'a NodeToGroupPropsMap) -> ExplainOptions<'a> {
        ExplainOptions::new(self.version)
            .with_display_properties(self.display_properties)
            .with_node_props(node_props)
    }
}

impl TryFrom<BTreeSet<String>> for ExplainConfig {
    type Error = ExplainError;

    fn try_from(mut flags: BTreeSet<String>) -> Result<Self, Self::Error> {
        let display_properties = flags.remove("display_properties");

        let mut version = None;
        for v in ExplainVersion::ALL {
            if flags.remove(v.as_str()) {
                if let Some(prev) = version {
                    return Err(ExplainError::ConflictingVersions(prev, v));
                }
                version = Some(v);
            }
        }

        if !flags.is_empty() {
            return Err(ExplainError::UnsupportedOptions(flags));
        }

        Ok(ExplainConfig {
            version: version.unwrap_or_default(),
            display_properties,
        })
    }
}
