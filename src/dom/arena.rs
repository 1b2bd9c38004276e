//! Arena-based tree for parsed XML source documents.
//!
//! All nodes live in a contiguous vector; parent/child/sibling links are
//! indices into that vector. The layout makes the milestone partitioner's
//! sibling-chain pruning cheap and keeps subtree clones allocation-friendly.

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the source XML arena.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element(Element),
    /// Text content (entities already resolved).
    Text(String),
    /// Comment, content between `<!--` and `-->`.
    Comment(String),
    /// Processing instruction, content between `<?` and `?>`.
    Pi(String),
}

/// A source XML element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Name exactly as written in the source, e.g. `tei:div` or `div`.
    pub name: String,
    /// Local name with any prefix stripped.
    pub local: String,
    /// Resolved namespace URI, if the element is in a namespace.
    pub namespace: Option<String>,
    /// Attributes in source order, names as written.
    pub attrs: Vec<Attribute>,
    /// True if the source used the `<name/>` form.
    pub self_closing: bool,
}

impl Element {
    /// Look up an attribute value by its literal source name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// XML attribute with its name as written in the source.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-allocated source document tree.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// The element data of a node, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.get(id)?.data {
            NodeData::Element(ref el) => Some(el),
            _ => None,
        }
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(Node::new(NodeData::Element(element)))
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_pi(&mut self, content: String) -> NodeId {
        self.alloc(Node::new(NodeData::Pi(content)))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Detach a node from its parent. The node stays allocated in the arena
    /// but is no longer reachable from the document.
    pub fn remove(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    pub fn prev_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.prev_sibling).unwrap_or(NodeId::NONE)
    }

    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.next_sibling).unwrap_or(NodeId::NONE)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// The first element child of the document node.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document)
            .find(|&c| matches!(self.get(c).map(|n| &n.data), Some(NodeData::Element(_))))
    }

    /// All descendant elements (including `root` itself) with the given local
    /// name, in document order.
    pub fn elements_by_local_name(&self, root: NodeId, local: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_by_local_name(root, local, &mut out);
        out
    }

    fn collect_by_local_name(&self, id: NodeId, local: &str, out: &mut Vec<NodeId>) {
        if let Some(el) = self.element(id)
            && el.local == local
        {
            out.push(id);
        }
        let mut child = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        while child.is_some() {
            self.collect_by_local_name(child, local, out);
            child = self.next_sibling(child);
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) => out.push_str(t),
            Some(NodeData::Element(_)) | Some(NodeData::Document) => {
                let mut child = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
                while child.is_some() {
                    self.collect_text(child, out);
                    child = self.next_sibling(child);
                }
            }
            _ => {}
        }
    }

    /// Deep-clone the subtree rooted at `id` into a fresh document.
    ///
    /// The clone is the partitioner's mutation-safe working copy; the source
    /// tree is never modified.
    pub fn clone_subtree(&self, id: NodeId) -> Dom {
        let mut clone = Dom::new();
        let doc = clone.document();
        self.clone_into(id, &mut clone, doc);
        clone
    }

    fn clone_into(&self, id: NodeId, target: &mut Dom, parent: NodeId) {
        let data = match self.get(id) {
            Some(n) => n.data.clone(),
            None => return,
        };
        let new_id = target.alloc(Node::new(data));
        target.append(parent, new_id);
        let mut child = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        while child.is_some() {
            self.clone_into(child, target, new_id);
            child = self.next_sibling(child);
        }
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    dom: &'a Dom,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        self.next = self.dom.next_sibling(current);
        Some(current)
    }
}
