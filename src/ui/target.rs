use std::collections::{BTreeMap, BTreeSet};

/// Handle to an element owned by a [`RenderTarget`].
pub type ElementId = usize;

/// The element-tree primitives the viewer draws with.
pub trait RenderTarget {
    fn create_element(&mut self, tag: &str, parent: Option<ElementId>) -> ElementId;
    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&mut self, element: ElementId, name: &str);
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;
    fn set_style(&mut self, element: ElementId, property: &str, value: &str);
    fn style(&self, element: ElementId, property: &str) -> Option<String>;
    fn set_text(&mut self, element: ElementId, text: &str);
    /// Detach and drop every child of `element`.
    fn remove_children(&mut self, element: ElementId);
    fn add_listener(&mut self, element: ElementId, event: &str);
    fn remove_listener(&mut self, element: ElementId, event: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub tag: String,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    pub listeners: BTreeSet<String>,
    pub detached: bool,
}

/// In-memory element tree.
///
/// Backs headless sessions and tests; every call is recorded in the tree
/// and can be inspected afterwards. A detached node keeps its slot until
/// the next `create_element` reuses it.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    nodes: Vec<Node>,
    free: Vec<ElementId>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element)
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(element)
            .map_or(&[], |node| node.children.as_slice())
    }

    /// Attached elements whose `class` list contains `class`.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.detached)
            .filter(|(_, node)| {
                node.attributes
                    .get("class")
                    .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_listening(&self, element: ElementId, event: &str) -> bool {
        self.nodes
            .get(element)
            .is_some_and(|node| node.listeners.contains(event))
    }

    pub fn text(&self, element: ElementId) -> &str {
        self.nodes.get(element).map_or("", |node| node.text.as_str())
    }

    /// Number of slots in the tree, attached or not.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn detach(&mut self, element: ElementId) {
        let children = match self.nodes.get_mut(element) {
            Some(node) if !node.detached => {
                node.detached = true;
                self.free.push(element);
                node.listeners.clear();
                std::mem::take(&mut node.children)
            }
            _ => return,
        };
        for child in children {
            self.detach(child);
        }
    }
}

impl RenderTarget for RecordingTarget {
    fn create_element(&mut self, tag: &str, parent: Option<ElementId>) -> ElementId {
        let node = Node {
            tag: tag.to_string(),
            parent,
            ..Node::default()
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(parent)) {
            parent.children.push(id);
        }
        id
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.attributes.remove(name);
        }
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.nodes.get(element)?.attributes.get(name).cloned()
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            if value.is_empty() {
                node.styles.remove(property);
            } else {
                node.styles.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.nodes.get(element)?.styles.get(property).cloned()
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.text = text.to_string();
        }
    }

    fn remove_children(&mut self, element: ElementId) {
        let children = self
            .nodes
            .get_mut(element)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            self.detach(child);
        }
    }

    fn add_listener(&mut self, element: ElementId, event: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.listeners.insert(event.to_string());
        }
    }

    fn remove_listener(&mut self, element: ElementId, event: &str) {
        if let Some(node) = self.nodes.get_mut(element) {
            node.listeners.remove(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_links_parent() {
        let mut target = RecordingTarget::new();
        let root = target.create_element("div", None);
        let child = target.create_element("img", Some(root));
        assert_eq!(target.children(root), &[child]);
        assert_eq!(target.node(child).unwrap().parent, Some(root));
    }

    #[test]
    fn test_remove_children_detaches_subtree() {
        let mut target = RecordingTarget::new();
        let root = target.create_element("ul", None);
        let li = target.create_element("li", Some(root));
        let img = target.create_element("img", Some(li));
        target.set_attribute(img, "class", "thumb");
        target.add_listener(img, "click");

        target.remove_children(root);
        assert!(target.children(root).is_empty());
        assert!(target.node(img).unwrap().detached);
        assert!(!target.is_listening(img, "click"));
        assert!(target.find_by_class("thumb").is_empty());
    }

    #[test]
    fn test_detached_slots_are_reused() {
        let mut target = RecordingTarget::new();
        let root = target.create_element("ul", None);
        for _ in 0..5 {
            target.remove_children(root);
            let li = target.create_element("li", Some(root));
            target.create_element("img", Some(li));
        }
        assert_eq!(target.capacity(), 3);
        assert_eq!(target.children(root).len(), 1);
        let li = target.children(root)[0];
        assert!(!target.node(li).unwrap().detached);
        assert_eq!(target.children(li).len(), 1);
    }

    #[test]
    fn test_empty_style_value_clears_property() {
        let mut target = RecordingTarget::new();
        let el = target.create_element("img", None);
        target.set_style(el, "border-color", "red");
        target.set_style(el, "border-color", "");
        assert_eq!(target.style(el, "border-color"), None);
    }

    #[test]
    fn test_find_by_class_matches_any_listed_class() {
        let mut target = RecordingTarget::new();
        let el = target.create_element("li", None);
        target.set_attribute(el, "class", "thumb active");
        assert_eq!(target.find_by_class("active"), vec![el]);
        assert!(target.find_by_class("act").is_empty());
    }
}
