// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use mz_abt::metadata::Metadata;
use mz_abt::PlanAndProps;

use crate::config::{ExplainOptions, ExplainVersion};
use crate::document::Document;
use crate::error::ExplainError;
use crate::generator::explain_document;
use crate::summary::plan_summary;

/// Something able to explain the plan it was created for.
pub trait PlanExplainer {
    /// The explain document of the plan.
    fn explain_document(&self) -> Result<Document, ExplainError>;

    /// A one-line synopsis of the plan's access paths.
    fn plan_summary(&self) -> String;
}

/// Explains a finalized plan after the optimizer that produced it is gone.
///
/// The printer owns the plan, its annotations and the catalog metadata the
/// plan was optimized against.
#[derive(Debug)]
pub struct AbtPrinter {
    metadata: Metadata,
    plan_and_props: PlanAndProps,
    version: ExplainVersion,
}

impl AbtPrinter {
    pub fn new(
        metadata: Metadata,
        plan_and_props: PlanAndProps,
        version: ExplainVersion,
    ) -> AbtPrinter {
        AbtPrinter {
            metadata,
            plan_and_props,
            version,
        }
    }

    pub fn version(&self) -> ExplainVersion {
        self.version
    }

    pub fn plan_and_props(&self) -> &PlanAndProps {
        &self.plan_and_props
    }
}

impl PlanExplainer for AbtPrinter {
    fn explain_document(&self) -> Result<Document, ExplainError> {
        let options = ExplainOptions::new(self.version)
            .with_display_properties(self.version != ExplainVersion::UserFacing)
            .with_node_props(&self.plan_and_props.map);
        explain_document(&self.plan_and_props.node, &options)
    }

    fn plan_summary(&self) -> String {
        plan_summary(&self.plan_and_props.node, &self.metadata)
    }
}
