//! Fluent assertion API for parse trees
//!
//! ```ignore
//! assert_tree(&node)
//!     .name("pair")
//!     .child_count(3)
//!     .child(0, |key| {
//!         key.name("key").value("a");
//!     });
//! ```

use crate::abnf::tree::Node;

/// Create an assertion builder for a parse tree
pub fn assert_tree(node: &Node) -> NodeAssertion<'_> {
    NodeAssertion {
        node,
        context: node.name().to_string(),
    }
}

pub struct NodeAssertion<'a> {
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    /// Assert the node name (case-insensitive, like rule names)
    pub fn name(self, expected: &str) -> Self {
        assert!(
            self.node.is_named(expected),
            "{}: Expected node named '{}', found '{}'",
            self.context,
            expected,
            self.node.name()
        );
        self
    }

    /// Assert the text the node matched
    pub fn value(self, expected: &str) -> Self {
        let actual = self.node.value();
        assert_eq!(
            actual, expected,
            "{}: Expected value {:?}, found {:?}",
            self.context, expected, actual
        );
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let actual = self.node.children().len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} children, found {}: [{}]",
            self.context,
            expected,
            actual,
            summarize(self.node.children())
        );
        self
    }

    /// Assert on a child by index
    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let children = self.node.children();
        assert!(
            index < children.len(),
            "{}: Child index {} out of bounds (node has {} children)",
            self.context,
            index,
            children.len()
        );
        let child = &children[index];
        assertion(NodeAssertion {
            node: child,
            context: format!("{}:{}[{}]", self.context, child.name(), index),
        });
        self
    }

    /// Assert on the first direct child with the given name
    pub fn child_named<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let child = self.node.child(name).unwrap_or_else(|| {
            panic!(
                "{}: No child named '{}' among [{}]",
                self.context,
                name,
                summarize(self.node.children())
            )
        });
        assertion(NodeAssertion {
            node: child,
            context: format!("{}:{}", self.context, name),
        });
        self
    }

    /// Assert how many nodes in the subtree carry the given name
    pub fn descendant_count(self, name: &str, expected: usize) -> Self {
        let actual = self.node.find_all(name).count();
        assert_eq!(
            actual, expected,
            "{}: Expected {} '{}' nodes in subtree, found {}",
            self.context, expected, name, actual
        );
        self
    }
}

fn summarize(children: &[Node]) -> String {
    children
        .iter()
        .map(|child| child.name())
        .collect::<Vec<_>>()
        .join(", ")
}
