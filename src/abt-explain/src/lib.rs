// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! `EXPLAIN` support for ABT plans.
//!
//! A plan can be rendered in one of several mutually exclusive dialects,
//! selected with an [`ExplainVersion`]:
//!
//! * `V1`, `V2` and `V2Compact` are indented text trees meant for people
//!   working on the optimizer. They differ in verbosity only.
//! * `V3` is a structured [`Document`] mirroring the plan tree.
//! * `UserFacing` is the stable, user-visible document of execution stages
//!   (`ROOT`, `FILTER`, `EVALUATION`, `COLLSCAN`, `EOF`), annotated with the
//!   costs and cardinalities found in a [`mz_abt::NodeToGroupPropsMap`].
//!
//! The entry points live in [`generator`] and are re-exported here. The
//! [`AbtPrinter`] bundles a finalized plan with everything needed to explain
//! it after the optimizer state is gone.

pub mod abt_printer;
pub mod artifacts;
pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod summary;
pub mod user_facing;

mod memo;
mod structured;
mod text;
mod tree;

pub use crate::abt_printer::{AbtPrinter, PlanExplainer};
pub use crate::artifacts::{
    explain_candidate_index, explain_compound_interval, explain_compound_interval_expr,
    explain_interval, explain_interval_expr, explain_partial_schema_req_expr,
    explain_residual_requirements,
};
pub use crate::config::{ExplainConfig, ExplainOptions, ExplainVersion};
pub use crate::document::{Document, TypeTag, Value};
pub use crate::error::ExplainError;
pub use crate::generator::{
    explain, explain_document, explain_document_str, explain_logical_props, explain_memo,
    explain_memo_document, explain_memo_value, explain_node, explain_phys_props, explain_v1,
    explain_v2, explain_v2_compact, explain_value,
};
pub use crate::summary::plan_summary;
pub use crate::user_facing::UserFacingExplain;
