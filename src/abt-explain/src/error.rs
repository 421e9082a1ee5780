// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::config::ExplainVersion;

/// Errors raised while configuring or generating an explanation.
///
/// `MissingNodeProperties`, `UnsupportedNode` and `EmptyPlan` are internal
/// consistency violations rather than bad input: a plan that reaches
/// `EXPLAIN` has already been validated by the optimizer. Each carries a
/// distinct diagnostic [`code`](ExplainError::code).
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("failed to find node properties for {node} node")]
    MissingNodeProperties { node: &'static str },
    #[error("trying to generate explain for an unsupported {node} node")]
    UnsupportedNode { node: &'static str },
    #[error("the plan has no nodes")]
    EmptyPlan,
    #[error("unknown explain version: {0}")]
    UnknownVersion(String),
    #[error("conflicting explain versions: {0} and {1}")]
    ConflictingVersions(ExplainVersion, ExplainVersion),
    #[error("unsupported 'with' option(s): {}", .0.iter().join(", "))]
    UnsupportedOptions(BTreeSet<String>),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ExplainError {
    pub const MISSING_NODE_PROPERTIES: u32 = 8075600;
    pub const EMPTY_PLAN: u32 = 8075604;
    pub const UNSUPPORTED_NODE: u32 = 8075606;

    /// The diagnostic code of an internal consistency violation, or `None`
    /// for configuration and serialization errors.
    pub fn code(&self) -> Option<u32> {
        match self {
            ExplainError::MissingNodeProperties { .. } => Some(Self::MISSING_NODE_PROPERTIES),
            ExplainError::UnsupportedNode { .. } => Some(Self::UNSUPPORTED_NODE),
            ExplainError::EmptyPlan => Some(Self::EMPTY_PLAN),
            ExplainError::UnknownVersion(_)
            | ExplainError::ConflictingVersions(..)
            | ExplainError::UnsupportedOptions(_)
            | ExplainError::Serialization(_) => None,
        }
    }
}
