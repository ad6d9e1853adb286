//! Arena-backed mutable DOM used by the extraction pipeline.
//!
//! Markup is parsed with `scraper` and copied into a flat arena of nodes
//! addressed by [`NodeId`]. Every node records its parent handle and an ordered
//! list of child handles, so renaming, moving and detaching nodes never
//! invalidates a handle. Detached nodes stay in the arena until the document is
//! dropped, and cloning a [`Document`] preserves every handle, which is what
//! lets the retry loop restore a pristine tree between attempts.

use crate::serializable_node::SerializableNode;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::{namespace_url, ns, LocalName, QualName};
use scraper::{Html, Node as ScraperNode};

/// Stable handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Payload of a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Qualified tag name plus attributes, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub name: QualName,
    pub attrs: Vec<(QualName, String)>,
}

impl ElementData {
    /// Local tag name, e.g. `div`.
    pub fn name(&self) -> &str {
        &self.name.local
    }

    /// Value of the unprefixed attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| is_plain_attr(key, name))
            .map(|(_, value)| value.as_str())
    }
}

fn is_plain_attr(key: &QualName, name: &str) -> bool {
    key.prefix.is_none() && &*key.local == name
}

fn plain_attr_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A mutable HTML tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a complete HTML document.
    pub fn parse(html: &str) -> Self {
        Self::from_html(&Html::parse_document(html))
    }

    /// Copy an already parsed `scraper` tree into a new arena.
    pub fn from_html(html: &Html) -> Self {
        let mut document = Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        };

        let root = document.root();
        let mut stack: Vec<_> = html
            .tree
            .root()
            .children()
            .map(|child| (root, child))
            .collect();
        stack.reverse();

        while let Some((parent, source)) = stack.pop() {
            let data = match source.value() {
                ScraperNode::Element(element) => NodeData::Element(ElementData {
                    name: element.name.clone(),
                    attrs: element
                        .attrs
                        .iter()
                        .map(|(name, value)| (name.clone(), value.to_string()))
                        .collect(),
                }),
                ScraperNode::Text(text) => NodeData::Text(text.to_string()),
                ScraperNode::Comment(comment) => NodeData::Comment(comment.to_string()),
                _ => continue,
            };

            let id = document.push(data);
            document.append_child(parent, id);

            let mut children: Vec<_> = source.children().map(|child| (id, child)).collect();
            children.reverse();
            stack.extend(children);
        }

        document
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The first `<body>` element in document order.
    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_tag(self.root(), "body").into_iter().next()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Comment(_))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::name)
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    pub fn set_tag_name(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element(element) = &mut self.node_mut(id).data {
            element.name.local = LocalName::from(name);
        }
    }

    pub fn attrs(&self, id: NodeId) -> &[(QualName, String)] {
        self.element(id)
            .map(|element| element.attrs.as_slice())
            .unwrap_or(&[])
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element(element) = &mut self.node_mut(id).data {
            match element.attrs.iter_mut().find(|(key, _)| is_plain_attr(key, name)) {
                Some(slot) => slot.1 = value.to_string(),
                None => element.attrs.push((plain_attr_name(name), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element(element) = &mut self.node_mut(id).data {
            element.attrs.retain(|(key, _)| !is_plain_attr(key, name));
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
            .collect()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&child| child == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&sibling| self.is_element(sibling))
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            name: QualName::new(None, ns!(html), LocalName::from(name)),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Unlink `id` from its parent. The subtree below `id` stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&child| child != id);
        }
    }

    /// Move `child` to the end of `parent`'s child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Put `replacement` where `old` is and detach `old`.
    ///
    /// `replacement` may be a descendant of `old`; it is unlinked first.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) {
        if old == replacement {
            return;
        }
        self.detach(replacement);
        if let Some((parent, index)) = self.index_in_parent(old) {
            self.node_mut(parent).children[index] = replacement;
            self.node_mut(replacement).parent = Some(parent);
            self.node_mut(old).parent = None;
        }
    }

    /// All nodes below `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements matching `predicate`, in document order.
    pub fn find_all<F>(&self, id: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&ElementData) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.element(node).is_some_and(&predicate))
            .collect()
    }

    /// Descendant elements named `tag`, in document order.
    pub fn elements_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.find_all(id, |element| element.name() == tag)
    }

    /// Element ancestors of `id`, nearest first. `max_depth == 0` means unbounded.
    pub fn ancestors(&self, id: NodeId, max_depth: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current.filter(|&node| self.is_element(node)) {
            out.push(ancestor);
            if max_depth > 0 && out.len() == max_depth {
                break;
            }
            current = self.parent(ancestor);
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Concatenated text of every text node in the subtree.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(text) = self.data(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Number of elements reachable from the document root.
    pub fn element_count(&self) -> usize {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.is_element(id))
            .count()
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        self.serialize(id, TraversalScope::IncludeNode)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let name = self.element(id).map(|element| element.name.clone());
        self.serialize(id, TraversalScope::ChildrenOnly(name))
    }

    fn serialize(&self, id: NodeId, traversal_scope: TraversalScope) -> String {
        let opts = SerializeOpts {
            scripting_enabled: false,
            traversal_scope,
            create_missing_parent: false,
        };

        let mut buffer = Vec::new();
        let node = SerializableNode { document: self, id };

        if serialize(&mut buffer, &node, opts).is_ok() {
            String::from_utf8(buffer).unwrap_or_default()
        } else {
            String::new()
        }
    }
}
