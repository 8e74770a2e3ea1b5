//! Tree mutation: insertion, removal, adoption and destruction.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! Every operation validates first and only then touches the arena, so an
//! `Err` always leaves the tree as it was.

use koala_common::string::try_push_str;

use crate::{Capability, DomError, DomTree, NodeData, NodeId, NodeType};

// =============================================================================
// Insertion
// =============================================================================

impl DomTree {
    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// "To pre-insert a node into a parent before a child"
    ///
    /// Inserts `node` into `parent` before `child` (or last when `child` is
    /// `None`) and returns the inserted node. A DocumentFragment contributes
    /// its children instead of itself and is left empty.
    ///
    /// # Errors
    ///
    /// [`DomError::HierarchyRequest`] and [`DomError::NotFound`] per
    /// "ensure pre-insert validity"; [`DomError::StaleNode`] if any id is gone.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<NodeId, DomError> {
        // STEP 1: "Ensure pre-insert validity of node into parent before child."
        self.ensure_pre_insert_validity(parent, node, child)?;

        // STEP 2: "Let referenceChild be child."
        // STEP 3: "If referenceChild is node, then set referenceChild to node's
        //          next sibling."
        let reference_child = if child == Some(node) {
            self.next_sibling(node)
        } else {
            child
        };

        // STEP 4: "Insert node into parent before referenceChild."
        self.insert(parent, node, reference_child)?;

        // STEP 5: "Return node."
        Ok(node)
    }

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// # Errors
    ///
    /// See [`DomTree::insert_before`].
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, DomError> {
        self.insert_before(parent, node, None)
    }

    /// [§ 4.2.3 Ensure pre-insert validity](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    ///
    /// Checks run in the DOM Standard's order: when `node` is an ancestor of
    /// `parent` and `child` is also foreign, `HierarchyRequest` wins over
    /// `NotFound`.
    fn ensure_pre_insert_validity(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), DomError> {
        let parent_type = self.node(parent)?.node_type;
        let node_type = self.node(node)?.node_type;
        if let Some(child) = child {
            let _ = self.node(child)?;
        }

        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //          node, then throw a "HierarchyRequestError" DOMException."
        if !Capability::ParentNode.satisfied_by(parent_type) {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }

        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //          then throw a "HierarchyRequestError" DOMException."
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::HierarchyRequest(
                "node is an inclusive ancestor of parent",
            ));
        }

        // STEP 3: "If child is non-null and its parent is not parent, then
        //          throw a "NotFoundError" DOMException."
        if let Some(child) = child
            && self.parent(child) != Some(parent)
        {
            return Err(DomError::NotFound("child is not a child of parent"));
        }

        // STEP 4: "If node is not a DocumentFragment, DocumentType, Element, or
        //          CharacterData node, then throw a "HierarchyRequestError"
        //          DOMException."
        if node_type == NodeType::Document {
            return Err(DomError::HierarchyRequest("a document cannot be inserted"));
        }

        // STEP 5: "If either node is a Text node and parent is a document, or
        //          node is a doctype and parent is not a document, then throw a
        //          "HierarchyRequestError" DOMException."
        if node_type == NodeType::Text && parent_type == NodeType::Document {
            return Err(DomError::HierarchyRequest("text cannot be a document child"));
        }
        if node_type == NodeType::DocumentType && parent_type != NodeType::Document {
            return Err(DomError::HierarchyRequest(
                "a doctype can only be a document child",
            ));
        }

        // STEP 6: "If parent is a document, and any of the statements below,
        //          switched on the interface node implements, are true, then
        //          throw a "HierarchyRequestError" DOMException."
        if parent_type == NodeType::Document {
            self.ensure_document_child_constraints(parent, node, node_type, child)?;
        }

        Ok(())
    }

    /// STEP 6 of "ensure pre-insert validity", for document parents.
    fn ensure_document_child_constraints(
        &self,
        parent: NodeId,
        node: NodeId,
        node_type: NodeType,
        child: Option<NodeId>,
    ) -> Result<(), DomError> {
        let child_is_doctype = child.is_some_and(|c| self.is(c, Capability::DocumentType));
        let doctype_follows_child = child.is_some_and(|c| self.doctype_follows(c));

        match node_type {
            // "DocumentFragment: If node has more than one element child or has
            //  a Text node child. Otherwise, if node has one element child and
            //  either parent has an element child, child is a doctype, or child
            //  is non-null and a doctype is following child."
            NodeType::DocumentFragment => {
                let element_children = self.count_children(node, Capability::Element);
                if element_children > 1 || self.count_children(node, Capability::Text) > 0 {
                    return Err(DomError::HierarchyRequest(
                        "fragment would give the document invalid children",
                    ));
                }
                if element_children == 1
                    && (self.count_children(parent, Capability::Element) > 0
                        || child_is_doctype
                        || doctype_follows_child)
                {
                    return Err(DomError::HierarchyRequest(
                        "document already has an element child",
                    ));
                }
            }
            // "Element: parent has an element child, child is a doctype, or
            //  child is non-null and a doctype is following child."
            NodeType::Element => {
                if self.count_children(parent, Capability::Element) > 0
                    || child_is_doctype
                    || doctype_follows_child
                {
                    return Err(DomError::HierarchyRequest(
                        "document already has an element child",
                    ));
                }
            }
            // "DocumentType: parent has a doctype child, child is non-null and
            //  an element is preceding child, or child is null and parent has
            //  an element child."
            NodeType::DocumentType => {
                let element_precedes_child = child.is_some_and(|c| self.element_precedes(c));
                if self.count_children(parent, Capability::DocumentType) > 0
                    || element_precedes_child
                    || (child.is_none() && self.count_children(parent, Capability::Element) > 0)
                {
                    return Err(DomError::HierarchyRequest(
                        "doctype must be unique and precede the document element",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn count_children(&self, parent: NodeId, capability: Capability) -> usize {
        self.children(parent)
            .iter()
            .filter(|&&c| self.is(c, capability))
            .count()
    }

    fn doctype_follows(&self, child: NodeId) -> bool {
        let mut current = self.next_sibling(child);
        while let Some(id) = current {
            if self.is(id, Capability::DocumentType) {
                return true;
            }
            current = self.next_sibling(id);
        }
        false
    }

    fn element_precedes(&self, child: NodeId) -> bool {
        let mut current = self.prev_sibling(child);
        while let Some(id) = current {
            if self.is(id, Capability::Element) {
                return true;
            }
            current = self.prev_sibling(id);
        }
        false
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// "To insert a node into a parent before a child"
    ///
    /// Mutation records, live ranges, slot assignment, custom element
    /// reactions and post-connection steps hook in here; none are modelled.
    fn insert(&mut self, parent: NodeId, node: NodeId, child: Option<NodeId>) -> Result<(), DomError> {
        // STEP 1: "Let nodes be node's children, if node is a DocumentFragment
        //          node; otherwise « node »."
        let nodes = if self.is(node, Capability::DocumentFragment) {
            self.children(node).to_vec()
        } else {
            vec![node]
        };

        // STEP 3: "If count is 0, then return."
        if nodes.is_empty() {
            return Ok(());
        }

        let document = if self.is(parent, Capability::Document) {
            Some(parent)
        } else {
            self.owner_document(parent)
        };

        // STEP 7: "For each node in nodes, in tree order:"
        for n in nodes {
            // STEP 7.1: "Adopt node into parent's node document."
            // Adoption also detaches `n` from its old parent, which is how a
            // fragment ends up empty.
            self.adopt(n, document)?;

            // STEP 7.2: "If child is null, then append node to parent's children."
            // STEP 7.3: "Otherwise, insert node into parent's children before
            //            child's index."
            self.link_child(parent, n, child)?;
        }
        Ok(())
    }

    /// Splice a detached `node` into `parent`'s children before `child`,
    /// keeping the sibling links in step with the list.
    fn link_child(&mut self, parent: NodeId, node: NodeId, child: Option<NodeId>) -> Result<(), DomError> {
        let siblings = &self.node(parent)?.children;
        let index = match child {
            Some(child) => siblings
                .iter()
                .position(|&c| c == child)
                .ok_or(DomError::NotFound("child is not a child of parent"))?,
            None => siblings.len(),
        };
        let prev = index.checked_sub(1).map(|i| siblings[i]);
        let next = siblings.get(index).copied();

        self.node_mut(parent)?.children.insert(index, node);
        {
            let inserted = self.node_mut(node)?;
            inserted.parent = Some(parent);
            inserted.prev_sibling = prev;
            inserted.next_sibling = next;
        }
        if let Some(prev) = prev {
            self.node_mut(prev)?.next_sibling = Some(node);
        }
        if let Some(next) = next {
            self.node_mut(next)?.prev_sibling = Some(node);
        }
        Ok(())
    }
}

// =============================================================================
// Removal and destruction
// =============================================================================

impl DomTree {
    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detach `node` from its parent, re-linking its former siblings. A node
    /// without a parent is left alone. The node stays alive.
    ///
    /// # Errors
    ///
    /// [`DomError::StaleNode`] if `node` is gone.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        // STEP 1: "Let parent be node's parent."
        // STEP 2: "Assert: parent is non-null."
        let (parent, prev, next) = {
            let n = self.node(node)?;
            match n.parent {
                Some(parent) => (parent, n.prev_sibling, n.next_sibling),
                None => return Ok(()),
            }
        };

        // STEP 12: "Remove node from its parent's children."
        self.node_mut(parent)?.children.retain(|&c| c != node);
        if let Some(prev) = prev {
            self.node_mut(prev)?.next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next)?.prev_sibling = prev;
        }

        let removed = self.node_mut(node)?;
        removed.parent = None;
        removed.prev_sibling = None;
        removed.next_sibling = None;
        Ok(())
    }

    /// [§ 4.2.3 Pre-remove](https://dom.spec.whatwg.org/#concept-node-pre-remove)
    ///
    /// `removeChild`: remove `child` from `parent` and return it.
    ///
    /// # Errors
    ///
    /// "If child's parent is not parent, then throw a "NotFoundError"
    /// DOMException."
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        let _ = self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotFound("child is not a child of parent"));
        }
        self.remove(child)?;
        Ok(child)
    }

    /// Detach `node` and free it together with all of its descendants.
    ///
    /// Every id into the destroyed subtree reports the node as gone from now
    /// on, and the slots are reused by later allocations.
    ///
    /// # Errors
    ///
    /// [`DomError::StaleNode`] if `node` is already gone.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), DomError> {
        self.remove(node)?;
        for id in self.descendants(node, true) {
            self.free_slot(id);
        }
        self.purge_names();
        Ok(())
    }
}

// =============================================================================
// Adoption
// =============================================================================

impl DomTree {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-adoptnode)
    ///
    /// "The adoptNode(node) method steps are:"
    ///
    /// # Errors
    ///
    /// - [`DomError::NotSupported`] if `node` is a Document
    /// - [`DomError::HierarchyRequest`] if `node` is a fragment with a host,
    ///   or `document` is not a Document
    /// - [`DomError::StaleNode`] if either id is gone
    pub fn adopt_node(&mut self, document: NodeId, node: NodeId) -> Result<NodeId, DomError> {
        if self.node(document)?.node_type != NodeType::Document {
            return Err(DomError::HierarchyRequest("adoption target is not a document"));
        }

        // STEP 1: "If node is a document, throw a "NotSupportedError"
        //          DOMException."
        // STEP 2: "If node is a shadow root, throw a "HierarchyRequestError"
        //          DOMException."
        // STEP 3: "If node is a DocumentFragment node whose host is non-null,
        //          then return."
        // A hosted fragment (template contents) is refused with an error
        // rather than silently ignored.
        match &self.node(node)?.data {
            NodeData::Document(_) => {
                return Err(DomError::NotSupported("a document cannot be adopted"));
            }
            NodeData::DocumentFragment(fragment) if fragment.host.is_some() => {
                return Err(DomError::HierarchyRequest(
                    "a fragment with a host cannot be adopted",
                ));
            }
            _ => {}
        }

        // STEP 4: "Adopt node into this."
        self.adopt(node, Some(document))?;

        // STEP 5: "Return node."
        Ok(node)
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-node-adopt)
    ///
    /// "To adopt a node into a document"
    pub(crate) fn adopt(&mut self, node: NodeId, document: Option<NodeId>) -> Result<(), DomError> {
        // STEP 1: "Let oldDocument be node's node document."
        let old_document = self.node(node)?.owner_document;

        // STEP 2: "If node's parent is non-null, then remove node."
        self.remove(node)?;

        // STEP 3: "If document is not oldDocument, then:"
        if document != old_document {
            // STEP 3.1: "For each inclusiveDescendant in node's shadow-including
            //            inclusive descendants: Set inclusiveDescendant's node
            //            document to document."
            // Attribute node documents and the adoptedCallback reactions of
            // STEP 3.2 are not modelled.
            for id in self.descendants(node, true) {
                self.node_mut(id)?.owner_document = document;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Payload mutation
// =============================================================================

impl DomTree {
    /// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#dom-characterdata-appenddata)
    ///
    /// "The appendData(data) method steps are to replace data of this with
    /// this's length, 0, and data."
    ///
    /// # Errors
    ///
    /// [`DomError::NotSupported`] if the node carries no character data and
    /// [`DomError::Capacity`] if the data cannot grow.
    pub fn append_data(&mut self, node: NodeId, data: &str) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.data {
            NodeData::CharacterData(character_data) => {
                try_push_str(&mut character_data.data, data)?;
                Ok(())
            }
            _ => Err(DomError::NotSupported("node has no character data")),
        }
    }

    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#concept-documentfragment-host)
    ///
    /// Bind a fragment to a host element (or unbind it with `None`), as a
    /// `<template>` does with its contents.
    ///
    /// # Errors
    ///
    /// [`DomError::NotSupported`] if `fragment` is not a fragment or `host`
    /// is not an element; [`DomError::StaleNode`] if either id is gone.
    pub fn set_fragment_host(&mut self, fragment: NodeId, host: Option<NodeId>) -> Result<(), DomError> {
        if let Some(host) = host
            && self.node(host)?.node_type != NodeType::Element
        {
            return Err(DomError::NotSupported("fragment host must be an element"));
        }
        match &mut self.node_mut(fragment)?.data {
            NodeData::DocumentFragment(data) => {
                data.host = host;
                Ok(())
            }
            _ => Err(DomError::NotSupported("node is not a document fragment")),
        }
    }
}
