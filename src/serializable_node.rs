//! Adapter that lets html5ever's serializer walk the arena [`Document`].

use crate::dom::{Document, NodeData, NodeId};
use html5ever::serialize::{Serialize, Serializer, TraversalScope};
use std::io;

pub(crate) struct SerializableNode<'a> {
    pub(crate) document: &'a Document,
    pub(crate) id: NodeId,
}

enum Edge {
    Open(NodeId),
    Close(NodeId),
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let mut stack = match traversal_scope {
            TraversalScope::IncludeNode => vec![Edge::Open(self.id)],
            TraversalScope::ChildrenOnly(_) => self
                .document
                .children(self.id)
                .iter()
                .rev()
                .map(|&child| Edge::Open(child))
                .collect(),
        };

        while let Some(edge) = stack.pop() {
            match edge {
                Edge::Open(node) => {
                    match self.document.data(node) {
                        NodeData::Document => {}
                        NodeData::Comment(comment) => serializer.write_comment(comment)?,
                        NodeData::Text(text) => serializer.write_text(text)?,
                        NodeData::Element(element) => {
                            serializer.start_elem(
                                element.name.clone(),
                                element.attrs.iter().map(|(name, value)| (name, value.as_str())),
                            )?;
                            stack.push(Edge::Close(node));
                        }
                    }

                    stack.extend(
                        self.document
                            .children(node)
                            .iter()
                            .rev()
                            .map(|&child| Edge::Open(child)),
                    );
                }
                Edge::Close(node) => {
                    if let Some(element) = self.document.element(node) {
                        serializer.end_elem(element.name.clone())?;
                    }
                }
            }
        }

        Ok(())
    }
}
