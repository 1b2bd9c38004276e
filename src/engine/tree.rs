//! Converted-element tree.
//!
//! The converter produces this arena from a source DOM. Elements carry the
//! synthesized tag, the original local name, and the flags the dispatcher
//! relies on. When a behavior replaces an element's content, the original
//! children move into the `hidden_original` slot; they are never deleted, so
//! the pristine source can always be reconstructed.

use crate::dom::Attribute;

/// Unique identifier for a node in the converted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WebNodeId(pub u32);

impl WebNodeId {
    pub const NONE: WebNodeId = WebNodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the converted tree.
#[derive(Debug, Clone)]
pub enum WebNodeData {
    Element(WebElement),
    Text(String),
    Comment(String),
    Pi(String),
    /// Behavior-generated markup, emitted verbatim by the HTML writer and
    /// ignored by the XML round-trip serializer.
    Raw(String),
}

/// A converted element.
#[derive(Debug, Clone)]
pub struct WebElement {
    /// Converted tag (`tei-div`), or the original name for elements in
    /// unregistered namespaces.
    pub tag: String,
    /// Original local name, used for serialization and behavior lookup.
    pub orig_name: String,
    /// Attributes, including the rewritten `id`/`lang`/`class` slots.
    pub attrs: Vec<Attribute>,
    /// True iff the source element had no child nodes.
    pub empty: bool,
    /// Set once a behavior has executed for this node.
    pub processed: bool,
    /// True for nodes synthesized by the converter or a behavior rather than
    /// converted from the source.
    pub generated: bool,
    /// Original children, moved here when a behavior inserts generated
    /// content. Never deleted.
    pub hidden_original: Vec<WebNodeId>,
}

impl WebElement {
    pub fn new(tag: impl Into<String>, orig_name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            orig_name: orig_name.into(),
            attrs: Vec::new(),
            empty: false,
            processed: false,
            generated: false,
            hidden_original: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
        } else {
            self.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Space-separated classes from the rewritten `class` slot.
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct WebNode {
    pub data: WebNodeData,
    pub parent: WebNodeId,
    pub first_child: WebNodeId,
    pub last_child: WebNodeId,
    pub prev_sibling: WebNodeId,
    pub next_sibling: WebNodeId,
}

impl WebNode {
    fn new(data: WebNodeData) -> Self {
        Self {
            data,
            parent: WebNodeId::NONE,
            first_child: WebNodeId::NONE,
            last_child: WebNodeId::NONE,
            prev_sibling: WebNodeId::NONE,
            next_sibling: WebNodeId::NONE,
        }
    }
}

/// Arena holding a converted document tree.
pub struct WebTree {
    nodes: Vec<WebNode>,
    root: WebNodeId,
}

impl Default for WebTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WebTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: WebNodeId::NONE,
        }
    }

    fn alloc(&mut self, node: WebNode) -> WebNodeId {
        let id = WebNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> WebNodeId {
        self.root
    }

    pub fn set_root(&mut self, root: WebNodeId) {
        self.root = root;
    }

    pub fn get(&self, id: WebNodeId) -> Option<&WebNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: WebNodeId) -> Option<&mut WebNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn element(&self, id: WebNodeId) -> Option<&WebElement> {
        match self.get(id)?.data {
            WebNodeData::Element(ref el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: WebNodeId) -> Option<&mut WebElement> {
        match self.get_mut(id)?.data {
            WebNodeData::Element(ref mut el) => Some(el),
            _ => None,
        }
    }

    pub fn create_element(&mut self, element: WebElement) -> WebNodeId {
        self.alloc(WebNode::new(WebNodeData::Element(element)))
    }

    pub fn create_text(&mut self, text: String) -> WebNodeId {
        self.alloc(WebNode::new(WebNodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> WebNodeId {
        self.alloc(WebNode::new(WebNodeData::Comment(text)))
    }

    pub fn create_pi(&mut self, content: String) -> WebNodeId {
        self.alloc(WebNode::new(WebNodeData::Pi(content)))
    }

    pub fn create_raw(&mut self, markup: String) -> WebNodeId {
        self.alloc(WebNode::new(WebNodeData::Raw(markup)))
    }

    pub fn append(&mut self, parent: WebNodeId, child: WebNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(WebNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = WebNodeId::NONE;
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

    pub fn next_sibling(&self, id: WebNodeId) -> WebNodeId {
        self.get(id).map(|n| n.next_sibling).unwrap_or(WebNodeId::NONE)
    }

    /// Children of a node, collected up front so callers may mutate while
    /// walking.
    pub fn child_ids(&self, id: WebNodeId) -> Vec<WebNodeId> {
        let mut out = Vec::new();
        let mut child = self.get(id).map(|n| n.first_child).unwrap_or(WebNodeId::NONE);
        while child.is_some() {
            out.push(child);
            child = self.next_sibling(child);
        }
        out
    }

    /// Move all current children into the element's `hidden_original` slot.
    ///
    /// The hidden nodes keep their parent link so serialization can still
    /// recurse through them; they are simply removed from the visible child
    /// chain.
    pub fn hide_children(&mut self, id: WebNodeId) {
        let children = self.child_ids(id);
        if children.is_empty() {
            return;
        }
        if let Some(node) = self.get_mut(id) {
            node.first_child = WebNodeId::NONE;
            node.last_child = WebNodeId::NONE;
        }
        for &child in &children {
            if let Some(c) = self.get_mut(child) {
                c.prev_sibling = WebNodeId::NONE;
                c.next_sibling = WebNodeId::NONE;
            }
        }
        if let Some(el) = self.element_mut(id) {
            el.hidden_original.extend(children);
        }
    }

    /// Deep-clone a node and its descendants within this tree.
    pub fn deep_clone(&mut self, id: WebNodeId) -> WebNodeId {
        let data = match self.get(id) {
            Some(n) => n.data.clone(),
            None => return WebNodeId::NONE,
        };
        let children = self.child_ids(id);
        let clone = self.alloc(WebNode::new(data));
        for child in children {
            let child_clone = self.deep_clone(child);
            self.append(clone, child_clone);
        }
        clone
    }

    /// Find the first descendant element (preorder, including `root`)
    /// matching the predicate.
    pub fn find_element<F>(&self, root: WebNodeId, predicate: &F) -> Option<WebNodeId>
    where
        F: Fn(&WebElement) -> bool,
    {
        if let Some(el) = self.element(root)
            && predicate(el)
        {
            return Some(root);
        }
        let mut child = self.get(root).map(|n| n.first_child).unwrap_or(WebNodeId::NONE);
        while child.is_some() {
            if let Some(found) = self.find_element(child, predicate) {
                return Some(found);
            }
            child = self.next_sibling(child);
        }
        None
    }

    /// All descendant elements (preorder, including `root`) matching the
    /// predicate.
    pub fn find_elements<F>(&self, root: WebNodeId, predicate: &F) -> Vec<WebNodeId>
    where
        F: Fn(&WebElement) -> bool,
    {
        let mut out = Vec::new();
        self.collect_elements(root, predicate, &mut out);
        out
    }

    fn collect_elements<F>(&self, id: WebNodeId, predicate: &F, out: &mut Vec<WebNodeId>)
    where
        F: Fn(&WebElement) -> bool,
    {
        if let Some(el) = self.element(id)
            && predicate(el)
        {
            out.push(id);
        }
        let mut child = self.get(id).map(|n| n.first_child).unwrap_or(WebNodeId::NONE);
        while child.is_some() {
            self.collect_elements(child, predicate, out);
            child = self.next_sibling(child);
        }
    }
}
