// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A line-oriented tree printer shared by the text dialects.

const INDENT: &str = "|   ";

/// A header line with nested fields and inputs.
///
/// Fields are printed below the header, each line prefixed with `|   `.
/// Inputs follow; all but the last are prefixed the same way and the last
/// is printed flush with the header, so linear chains read top-down:
///
/// ```text
/// Filter []
/// |   EvalFilter []
/// |   |   Variable [p0]
/// |   PathIdentity []
/// PhysicalScan [{'<root>': p0}, coll1, Forward]
/// ```
///
/// A compact tree is printed on a single line instead: every item but the
/// last is parenthesized, the last follows unadorned.
#[derive(Clone, Debug, Default)]
pub(crate) struct PrintTree {
    header: String,
    fields: Vec<PrintTree>,
    inputs: Vec<PrintTree>,
    compact: bool,
}

impl PrintTree {
    pub fn new(header: impl Into<String>) -> PrintTree {
        PrintTree {
            header: header.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: PrintTree) -> PrintTree {
        self.fields.push(field);
        self
    }

    pub fn push_field(&mut self, field: PrintTree) {
        self.fields.push(field);
    }

    pub fn push_input(&mut self, input: PrintTree) {
        self.inputs.push(input);
    }

    pub fn set_compact(&mut self, compact: bool) {
        self.compact = compact;
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    fn write_lines(&self, lines: &mut Vec<String>) {
        if self.compact {
            lines.push(self.compact_line());
            return;
        }
        lines.push(self.header.clone());
        for field in &self.fields {
            Self::write_nested(field, INDENT, lines);
        }
        let last = self.inputs.len().saturating_sub(1);
        for (i, input) in self.inputs.iter().enumerate() {
            let prefix = if i < last { INDENT } else { "" };
            Self::write_nested(input, prefix, lines);
        }
    }

    fn write_nested(tree: &PrintTree, prefix: &str, lines: &mut Vec<String>) {
        let mut nested = vec![];
        tree.write_lines(&mut nested);
        lines.extend(nested.into_iter().map(|line| format!("{}{}", prefix, line)));
    }

    fn compact_line(&self) -> String {
        let mut line = self.header.clone();
        let items: Vec<_> = self.fields.iter().chain(self.inputs.iter()).collect();
        if let Some((last, rest)) = items.split_last() {
            for item in rest {
                line.push_str(&format!(" ({})", item.compact_line()));
            }
            line.push(' ');
            line.push_str(&last.compact_line());
        }
        line
    }

    /// Renders the tree, one line per entry, with a trailing newline.
    pub fn into_text(self) -> String {
        let mut lines = vec![];
        self.write_lines(&mut lines);
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Renders the tree on a single line, without a trailing newline.
    pub fn into_line(self) -> String {
        self.compact_line()
    }
}
