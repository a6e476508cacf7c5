use crate::assemble::SyntaxNode;
use tree_sitter::{Node, Point};

impl SyntaxNode for Node<'_> {
    fn start_byte(&self) -> usize {
        Node::start_byte(self)
    }

    fn end_byte(&self) -> usize {
        Node::end_byte(self)
    }

    fn start_position(&self) -> Point {
        Node::start_position(self)
    }
}
