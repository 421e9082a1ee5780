// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Index bounds and the predicate requirements they are derived from.

use std::fmt;

use crate::node::{FieldProjectionMap, ProjectionName};
use crate::syntax::{Datum, Expr};

/// A boolean formula over atoms of type `T`.
#[derive(Clone, Debug, PartialEq)]
pub enum BoolExpr<T> {
    Atom(T),
    Conjunction(Vec<BoolExpr<T>>),
    Disjunction(Vec<BoolExpr<T>>),
}

impl<T> BoolExpr<T> {
    /// A disjunction of a single conjunction of a single atom, the normal
    /// form of a formula with one atom.
    pub fn singular_dnf(atom: T) -> BoolExpr<T> {
        BoolExpr::Disjunction(vec![BoolExpr::Conjunction(vec![BoolExpr::Atom(atom)])])
    }

    /// Calls `f` on every atom, left to right.
    pub fn visit_atoms<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a T),
    {
        match self {
            BoolExpr::Atom(atom) => f(atom),
            BoolExpr::Conjunction(children) | BoolExpr::Disjunction(children) => {
                for child in children {
                    child.visit_atoms(f);
                }
            }
        }
    }
}

/// One end of an interval.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundRequirement {
    pub inclusive: bool,
    pub bound: Expr,
}

impl BoundRequirement {
    pub fn new(inclusive: bool, bound: Expr) -> BoundRequirement {
        BoundRequirement { inclusive, bound }
    }

    pub fn min_key() -> BoundRequirement {
        BoundRequirement::new(true, Expr::Constant(Datum::MinKey))
    }

    pub fn max_key() -> BoundRequirement {
        BoundRequirement::new(true, Expr::Constant(Datum::MaxKey))
    }

    pub fn is_min_key(&self) -> bool {
        self.inclusive && self.bound == Expr::Constant(Datum::MinKey)
    }

    pub fn is_max_key(&self) -> bool {
        self.inclusive && self.bound == Expr::Constant(Datum::MaxKey)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntervalRequirement {
    pub low: BoundRequirement,
    pub high: BoundRequirement,
}

impl IntervalRequirement {
    pub fn new(low: BoundRequirement, high: BoundRequirement) -> IntervalRequirement {
        IntervalRequirement { low, high }
    }

    /// The interval `[minKey, maxKey]`.
    pub fn fully_open() -> IntervalRequirement {
        IntervalRequirement::new(BoundRequirement::min_key(), BoundRequirement::max_key())
    }

    /// The interval `[bound, bound]`.
    pub fn equals(bound: Expr) -> IntervalRequirement {
        IntervalRequirement::new(
            BoundRequirement::new(true, bound.clone()),
            BoundRequirement::new(true, bound),
        )
    }

    pub fn is_fully_open(&self) -> bool {
        self.low.is_min_key() && self.high.is_max_key()
    }

    pub fn is_equality(&self) -> bool {
        self.low.inclusive && self.high.inclusive && self.low.bound == self.high.bound
    }
}

/// One interval per field of a compound index key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompoundIntervalRequirement(pub Vec<IntervalRequirement>);

pub type IntervalReqExpr = BoolExpr<IntervalRequirement>;
pub type CompoundIntervalReqExpr = BoolExpr<CompoundIntervalRequirement>;

/// Identifies the value a requirement applies to: `path` evaluated against
/// `projection`.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialSchemaKey {
    pub projection: Option<ProjectionName>,
    pub path: Expr,
}

/// Requires the value of a [`PartialSchemaKey`] to lie in `intervals`,
/// optionally binding it to `bound_projection`.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialSchemaRequirement {
    pub bound_projection: Option<ProjectionName>,
    pub intervals: IntervalReqExpr,
    /// The requirement only helps estimation and need not be enforced.
    pub perf_only: bool,
}

pub type PartialSchemaEntry = (PartialSchemaKey, PartialSchemaRequirement);

pub type PSRExpr = BoolExpr<PartialSchemaEntry>;

/// A requirement left to be checked after an index scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualRequirement {
    pub key: PartialSchemaKey,
    pub req: PartialSchemaRequirement,
    /// Position of the originating entry in the requirements.
    pub entry_index: usize,
}

pub type ResidualRequirements = BoolExpr<ResidualRequirement>;

/// The alternatives a sargable node is allowed to be implemented with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexReqTarget {
    Complete,
    Index,
    Seek,
}

impl fmt::Display for IndexReqTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexReqTarget::Complete => f.write_str("Complete"),
            IndexReqTarget::Index => f.write_str("Index"),
            IndexReqTarget::Seek => f.write_str("Seek"),
        }
    }
}

/// An index able to satisfy (part of) a sargable node's requirements.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateIndexEntry {
    pub index_def_name: String,
    pub field_projection_map: FieldProjectionMap,
    pub intervals: CompoundIntervalReqExpr,
    pub residual_requirements: Option<ResidualRequirements>,
    /// Positions at which the equality prefixes of `intervals` end.
    pub eq_prefixes: Vec<usize>,
}
