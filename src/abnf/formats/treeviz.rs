//! Treeviz formatter for parse trees
//!
//! One line per node, nesting drawn with box connectors:
//!
//! ```text
//! └─ pair: a=1
//!   ├─ key: a
//!   │ └─ literal: a
//!   ├─ literal: =
//!   └─ value: 1
//!     └─ literal: 1
//! ```
//!
//! Labels are the matched text, escaped and truncated to 30 characters.

use super::{FormatError, Formatter};
use crate::abnf::tree::{LiteralNode, Node, NodeVisitor, RuleNode, LITERAL_NODE_NAME};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn escape(s: &str) -> String {
    s.replace('\r', "\\r")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

pub fn to_treeviz_str(node: &Node) -> String {
    let mut writer = TreevizWriter::default();
    writer.visit(node);
    writer.out
}

#[derive(Default)]
struct TreevizWriter {
    out: String,
    prefix: String,
    is_last: bool,
}

impl TreevizWriter {
    fn line(&mut self, name: &str, value: &str) {
        let connector = if self.is_last || self.prefix.is_empty() {
            "└─"
        } else {
            "├─"
        };
        self.out.push_str(&format!(
            "{}{} {}: {}\n",
            self.prefix,
            connector,
            name,
            truncate(&escape(value), 30)
        ));
    }

    fn children(&mut self, children: &[Node]) {
        let saved = self.prefix.clone();
        let was_last = self.is_last || saved.is_empty();
        self.prefix.push_str(if was_last { "  " } else { "│ " });
        for (i, child) in children.iter().enumerate() {
            self.is_last = i == children.len() - 1;
            self.visit(child);
        }
        self.prefix = saved;
    }
}

impl NodeVisitor for TreevizWriter {
    type Output = ();

    fn visit_rule(&mut self, node: &RuleNode) {
        self.line(&node.name, &node.value());
        self.children(&node.children);
    }

    fn visit_literal(&mut self, leaf: &LiteralNode) {
        self.line(LITERAL_NODE_NAME, &leaf.value);
    }
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, node: &Node) -> Result<String, FormatError> {
        Ok(to_treeviz_str(node))
    }

    fn description(&self) -> &str {
        "One line per node with box-drawing connectors"
    }
}
