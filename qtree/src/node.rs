//! The quadtree node type.

/// A single node of a quadtree.
///
/// A node is either a uniform block of one intensity, or a region split
/// into four equally sized quadrants. Children are owned by exactly one
/// parent; two quadrants with the same value still get their own leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// A region where every pixel has this intensity.
    Leaf(u8),

    /// A region divided into four sub-regions.
    Split(Box<Quadrants>),
}

/// The four children of a split node.
///
/// The field order is also the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quadrants {
    pub upper_left: Node,
    pub upper_right: Node,
    pub lower_left: Node,
    pub lower_right: Node,
}

impl Quadrants {
    /// The children in upper-left, upper-right, lower-left, lower-right order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        [
            &self.upper_left,
            &self.upper_right,
            &self.lower_left,
            &self.lower_right,
        ]
        .into_iter()
    }
}

impl From<[Node; 4]> for Quadrants {
    fn from([upper_left, upper_right, lower_left, lower_right]: [Node; 4]) -> Self {
        Self {
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }
    }
}

impl Node {
    /// Create a split node from four children.
    pub fn split(upper_left: Node, upper_right: Node, lower_left: Node, lower_right: Node) -> Self {
        Node::Split(Box::new(Quadrants {
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// The intensity of a leaf, or `None` for a split.
    pub fn value(&self) -> Option<u8> {
        match self {
            Node::Leaf(v) => Some(*v),
            Node::Split(_) => None,
        }
    }

    /// The children of a split, or `None` for a leaf.
    pub fn quadrants(&self) -> Option<&Quadrants> {
        match self {
            Node::Leaf(_) => None,
            Node::Split(q) => Some(q),
        }
    }

    /// Total number of nodes, leaves and splits both.
    ///
    /// This is the number of tokens the tree serializes to.
    pub fn node_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Split(q) => 1 + q.iter().map(Node::node_count).sum::<usize>(),
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Split(q) => q.iter().map(Node::leaf_count).sum(),
        }
    }

    /// Number of split levels on the deepest path. A lone leaf has depth 0.
    pub fn depth(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Split(q) => 1 + q.iter().map(Node::depth).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::split(
            Node::Leaf(1),
            Node::split(Node::Leaf(2), Node::Leaf(3), Node::Leaf(4), Node::Leaf(5)),
            Node::Leaf(6),
            Node::Leaf(7),
        )
    }

    #[test]
    fn counts() {
        let tree = sample();
        assert_eq!(tree.node_count(), 9);
        assert_eq!(tree.leaf_count(), 7);
        assert_eq!(tree.depth(), 2);

        let leaf = Node::Leaf(42);
        assert_eq!(leaf.node_count(), 1);
        assert_eq!(leaf.depth(), 0);
        assert_eq!(leaf.value(), Some(42));
    }

    #[test]
    fn quadrant_order() {
        let tree = sample();
        let values: Vec<_> = tree
            .quadrants()
            .unwrap()
            .iter()
            .map(|n| n.value())
            .collect();

        assert_eq!(values, vec![Some(1), None, Some(6), Some(7)]);
    }

    #[test]
    fn from_array() {
        let q = Quadrants::from([Node::Leaf(0), Node::Leaf(1), Node::Leaf(2), Node::Leaf(3)]);
        assert_eq!(q.lower_left, Node::Leaf(2));
    }
}
