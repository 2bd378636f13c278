//! Parse tree model
//!
//! A successful parse produces a tree of [`Node`]s: one [`RuleNode`] per rule that matched,
//! holding the nodes its definition produced, and a [`LiteralNode`] leaf for every terminal.
//! Inner nodes store no text of their own; their value is the concatenation of their
//! children's values, so a node's value is always the exact slice of input it matched.
//!
//! Nodes are reference counted. Combinators copy node sequences freely while exploring
//! ambiguous matches, and cloning a node only bumps a counter.

use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Name reported by every terminal leaf.
pub const LITERAL_NODE_NAME: &str = "literal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Rule(Rc<RuleNode>),
    Literal(Rc<LiteralNode>),
}

/// A named node produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleNode {
    pub name: Rc<str>,
    pub children: Vec<Node>,
}

impl RuleNode {
    pub fn value(&self) -> String {
        let mut value = String::new();
        self.children.iter().for_each(|child| child.push_value(&mut value));
        value
    }
}

/// A terminal leaf: the matched text, where it starts and how many bytes it spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralNode {
    pub value: String,
    pub offset: usize,
    pub length: usize,
}

impl Node {
    pub fn rule(name: impl Into<Rc<str>>, children: Vec<Node>) -> Node {
        Node::Rule(Rc::new(RuleNode {
            name: name.into(),
            children,
        }))
    }

    pub fn literal(value: impl Into<String>, offset: usize) -> Node {
        let value = value.into();
        Node::Literal(Rc::new(LiteralNode {
            length: value.len(),
            value,
            offset,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Rule(node) => &node.name,
            Node::Literal(_) => LITERAL_NODE_NAME,
        }
    }

    /// The text this node matched.
    pub fn value(&self) -> String {
        let mut value = String::new();
        self.push_value(&mut value);
        value
    }

    fn push_value(&self, out: &mut String) {
        match self {
            Node::Rule(node) => node.children.iter().for_each(|child| child.push_value(out)),
            Node::Literal(leaf) => out.push_str(&leaf.value),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Rule(node) => &node.children,
            Node::Literal(_) => &[],
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    /// First direct child with the given (case-insensitive) name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().iter().find(|child| child.is_named(name))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children().iter().filter(move |child| child.is_named(name))
    }

    /// This node and every node below it, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.descendants().filter(move |node| node.is_named(name))
    }

    pub fn as_rule(&self) -> Option<&RuleNode> {
        match self {
            Node::Rule(node) => Some(node),
            Node::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralNode> {
        match self {
            Node::Rule(_) => None,
            Node::Literal(leaf) => Some(leaf),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Rule(node) => {
                write!(f, "Node(name={}, children=[", node.name)?;
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("])")
            }
            Node::Literal(leaf) => write!(
                f,
                "Node(name={}, offset={}, value=\"{}\")",
                LITERAL_NODE_NAME,
                leaf.offset,
                leaf.value.replace('\r', "\\r").replace('\n', "\\n")
            ),
        }
    }
}

/// Preorder walk over a subtree, see [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// External visitor over parse trees, dispatching on the node kind.
pub trait NodeVisitor {
    type Output;

    fn visit(&mut self, node: &Node) -> Self::Output {
        match node {
            Node::Rule(node) => self.visit_rule(node),
            Node::Literal(leaf) => self.visit_literal(leaf),
        }
    }

    fn visit_rule(&mut self, node: &RuleNode) -> Self::Output;

    fn visit_literal(&mut self, leaf: &LiteralNode) -> Self::Output;
}

/// One way a combinator can match: the nodes produced so far and the offset right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub nodes: Vec<Node>,
    pub end: usize,
}

impl Match {
    pub fn new(nodes: Vec<Node>, end: usize) -> Self {
        Match { nodes, end }
    }

    /// The zero-width match at `offset`.
    pub fn empty(offset: usize) -> Self {
        Match::new(Vec::new(), offset)
    }

    pub fn value(&self) -> String {
        let mut value = String::new();
        self.nodes.iter().for_each(|node| node.push_value(&mut value));
        value
    }

    /// This match followed by `next`, which must start where this one ends.
    pub(crate) fn followed_by(&self, next: &Match) -> Match {
        let mut nodes = Vec::with_capacity(self.nodes.len() + next.nodes.len());
        nodes.extend(self.nodes.iter().cloned());
        nodes.extend(next.nodes.iter().cloned());
        Match::new(nodes, next.end)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Match(nodes=[")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, "], end={})", self.end)
    }
}
