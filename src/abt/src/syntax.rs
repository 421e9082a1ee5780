// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Scalar and path expressions bound inside plan nodes.

use std::fmt;

use crate::node::ProjectionName;

/// A constant value appearing in an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    /// The absence of a value. A projection bound to `Nothing` produces no
    /// field at all.
    Nothing,
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    /// Sorts before every other value; used for open lower bounds.
    MinKey,
    /// Sorts after every other value; used for open upper bounds.
    MaxKey,
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Nothing => f.write_str("Nothing"),
            Datum::Null => f.write_str("null"),
            Datum::Boolean(b) => write!(f, "{}", b),
            Datum::Int32(i) => write!(f, "{}", i),
            Datum::Int64(i) => write!(f, "{}", i),
            Datum::Double(d) => write!(f, "{}", d),
            Datum::String(s) => write!(f, "{:?}", s),
            Datum::MinKey => f.write_str("minKey"),
            Datum::MaxKey => f.write_str("maxKey"),
        }
    }
}

/// Operators of [`Expr::UnaryOp`], [`Expr::BinaryOp`] and [`Expr::PathCompare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operations {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Add,
    Sub,
    Mult,
    Div,
    And,
    Or,
    Not,
    Neg,
}

impl Operations {
    pub fn name(&self) -> &'static str {
        match self {
            Operations::Eq => "Eq",
            Operations::Neq => "Neq",
            Operations::Gt => "Gt",
            Operations::Gte => "Gte",
            Operations::Lt => "Lt",
            Operations::Lte => "Lte",
            Operations::Add => "Add",
            Operations::Sub => "Sub",
            Operations::Mult => "Mult",
            Operations::Div => "Div",
            Operations::And => "And",
            Operations::Or => "Or",
            Operations::Not => "Not",
            Operations::Neg => "Neg",
        }
    }
}

impl fmt::Display for Operations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An expression.
///
/// Path expressions (`Path*` variants) describe how to navigate and test a
/// document; they are applied to an input with [`Expr::EvalPath`] or
/// [`Expr::EvalFilter`]. Equality is deep and structural.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Constant(Datum),
    Variable(ProjectionName),
    UnaryOp {
        op: Operations,
        input: Box<Expr>,
    },
    BinaryOp {
        op: Operations,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
    /// Evaluates `path` against `input` and returns the result.
    EvalPath {
        path: Box<Expr>,
        input: Box<Expr>,
    },
    /// Evaluates `path` against `input` and returns whether it holds.
    EvalFilter {
        path: Box<Expr>,
        input: Box<Expr>,
    },
    PathIdentity,
    PathConstant(Box<Expr>),
    PathGet {
        field: String,
        input: Box<Expr>,
    },
    /// Descends into arrays, at most `max_depth` levels (`None` is unbounded).
    PathTraverse {
        max_depth: Option<u32>,
        input: Box<Expr>,
    },
    PathCompare {
        op: Operations,
        value: Box<Expr>,
    },
    PathComposeM {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// The `Nothing` constant.
    pub fn nothing() -> Expr {
        Expr::Constant(Datum::Nothing)
    }

    pub fn constant(datum: Datum) -> Expr {
        Expr::Constant(datum)
    }

    pub fn int64(i: i64) -> Expr {
        Expr::Constant(Datum::Int64(i))
    }

    pub fn variable(name: impl Into<ProjectionName>) -> Expr {
        Expr::Variable(name.into())
    }

    pub fn binary(op: Operations, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eval_filter(path: Expr, input: Expr) -> Expr {
        Expr::EvalFilter {
            path: Box::new(path),
            input: Box::new(input),
        }
    }

    pub fn eval_path(path: Expr, input: Expr) -> Expr {
        Expr::EvalPath {
            path: Box::new(path),
            input: Box::new(input),
        }
    }

    pub fn path_get(field: impl Into<String>, input: Expr) -> Expr {
        Expr::PathGet {
            field: field.into(),
            input: Box::new(input),
        }
    }

    pub fn path_traverse(max_depth: Option<u32>, input: Expr) -> Expr {
        Expr::PathTraverse {
            max_depth,
            input: Box::new(input),
        }
    }

    pub fn path_compare(op: Operations, value: Expr) -> Expr {
        Expr::PathCompare {
            op,
            value: Box::new(value),
        }
    }

    /// Returns `true` iff this is the `Nothing` constant.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Expr::Constant(Datum::Nothing))
    }

    /// The name under which the variant is rendered.
    pub fn name(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "Const",
            Expr::Variable(_) => "Variable",
            Expr::UnaryOp { .. } => "UnaryOp",
            Expr::BinaryOp { .. } => "BinaryOp",
            Expr::If { .. } => "If",
            Expr::FunctionCall { .. } => "FunctionCall",
            Expr::EvalPath { .. } => "EvalPath",
            Expr::EvalFilter { .. } => "EvalFilter",
            Expr::PathIdentity => "PathIdentity",
            Expr::PathConstant(_) => "PathConstant",
            Expr::PathGet { .. } => "PathGet",
            Expr::PathTraverse { .. } => "PathTraverse",
            Expr::PathCompare { .. } => "PathCompare",
            Expr::PathComposeM { .. } => "PathComposeM",
        }
    }

    /// The sub-expressions of this expression, in rendering order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Constant(_) | Expr::Variable(_) | Expr::PathIdentity => vec![],
            Expr::UnaryOp { input, .. } => vec![&**input],
            Expr::BinaryOp { left, right, .. } => vec![&**left, &**right],
            Expr::If { cond, then, els } => vec![&**cond, &**then, &**els],
            Expr::FunctionCall { args, .. } => args.iter().collect(),
            Expr::EvalPath { path, input } | Expr::EvalFilter { path, input } => {
                vec![&**input, &**path]
            }
            Expr::PathConstant(value) => vec![&**value],
            Expr::PathGet { input, .. } | Expr::PathTraverse { input, .. } => vec![&**input],
            Expr::PathCompare { value, .. } => vec![&**value],
            Expr::PathComposeM { left, right } => vec![&**left, &**right],
        }
    }
}
