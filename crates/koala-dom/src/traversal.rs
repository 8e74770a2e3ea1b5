//! Read-only tree queries.

use std::collections::HashSet;

use crate::{Capability, DomTree, NodeData, NodeId, NodeType};

impl DomTree {
    /// [§ 4.2 Node tree](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Descendants of `id` in tree order (pre-order, depth-first), preceded by
    /// `id` itself when `include_self` is set. The result is a snapshot: it
    /// does not follow later mutations. A destroyed node has no descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId, include_self: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        if include_self {
            out.push(id);
        }
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// [§ 4.2 Node tree](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.2 Node tree](https://dom.spec.whatwg.org/#concept-tree-inclusive-ancestor)
    ///
    /// "An inclusive ancestor is an object or one of its ancestors."
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.is_descendant_of(node, ancestor)
    }

    /// [§ 4.2 Node tree](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// "The root of an object is itself, if its parent is null, or else it is
    /// the root of its parent."
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// [§ 4.2 Node tree](https://dom.spec.whatwg.org/#document-element)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.children(document)
            .iter()
            .find(|&&id| self.is(id, Capability::Element))
            .copied()
    }

    /// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// The concatenated Text data of an element or fragment, the data of a
    /// character-data node, and `None` for documents and doctypes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        match self.get(id)?.data() {
            NodeData::Document(_) | NodeData::DocumentType(_) => None,
            NodeData::CharacterData(data) => Some(data.data.clone()),
            NodeData::DocumentFragment(_) | NodeData::Element(_) => Some(
                self.descendants(id, false)
                    .into_iter()
                    .filter_map(|d| self.as_text(d))
                    .collect(),
            ),
        }
    }

    /// Walk every live node and verify the structural invariants:
    ///
    /// - each child's parent link names the node listing it, exactly once
    /// - sibling links match positions in the children list
    /// - a detached node has no sibling links
    /// - documents and fragments never appear as children
    /// - a node in a tree shares its parent's node document
    /// - no node is its own ancestor
    ///
    /// # Errors
    ///
    /// A description of the first violation found.
    pub fn check_tree_invariants(&self) -> Result<(), String> {
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(node) = &slot.node else { continue };
            let id = NodeId {
                index: u32::try_from(index).map_err(|e| e.to_string())?,
                generation: slot.generation,
            };

            let mut seen = HashSet::new();
            for (position, &child) in node.children.iter().enumerate() {
                let Some(child_node) = self.get(child) else {
                    return Err(format!("{id} lists destroyed child {child}"));
                };
                if !seen.insert(child) {
                    return Err(format!("{id} lists {child} twice"));
                }
                if child_node.parent != Some(id) {
                    return Err(format!("{child} is listed by {id} but points at {:?}", child_node.parent));
                }
                let expected_prev = position.checked_sub(1).map(|p| node.children[p]);
                let expected_next = node.children.get(position + 1).copied();
                if child_node.prev_sibling != expected_prev || child_node.next_sibling != expected_next {
                    return Err(format!("{child} has sibling links out of step with {id}"));
                }
                if matches!(
                    child_node.node_type,
                    NodeType::Document | NodeType::DocumentFragment
                ) {
                    return Err(format!("{child} is a {} with a parent", child_node.node_type));
                }
                let expected_owner = if node.node_type == NodeType::Document {
                    Some(id)
                } else {
                    node.owner_document
                };
                if child_node.owner_document != expected_owner {
                    return Err(format!("{child} is owned by a different document than {id}"));
                }
            }

            match node.parent {
                None => {
                    if node.prev_sibling.is_some() || node.next_sibling.is_some() {
                        return Err(format!("detached {id} still has sibling links"));
                    }
                }
                Some(parent) => {
                    if !self.children(parent).contains(&id) {
                        return Err(format!("{id} points at {parent} which does not list it"));
                    }
                }
            }

            if self.ancestors(id).take(self.live + 1).count() > self.live {
                return Err(format!("{id} is part of a parent cycle"));
            }
        }
        Ok(())
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
