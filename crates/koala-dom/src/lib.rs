//! DOM tree implementation for the Koala HTML front end.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with generational [`NodeId`] indices for
//! all relationships, providing O(1) access and traversal without borrow
//! checker issues. One [`DomTree`] can hold nodes of several documents;
//! moving a subtree between them runs the adoption algorithm.
//!
//! Node names are interned through [`koala_std::Ref`] handles. The table
//! itself only keeps [`koala_std::WeakRef`]s, so a name disappears from it as
//! soon as the last node carrying it is destroyed.

mod error;
mod mutation;
mod node;
mod traversal;

use std::collections::HashMap;

use koala_std::{Ref, WeakRef};

pub use error::DomError;
pub use node::{
    Capability, CharacterData, CharacterDataKind, DocumentData, DocumentFragmentData,
    DocumentTypeData, ElementData, Node, NodeData, NodeId, NodeType, QuirksMode,
};
pub use traversal::AncestorIterator;

/// One arena cell. `node` is `None` once the slot has been freed.
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by `NodeId`
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
/// - Stale-id detection after [`DomTree::destroy`]
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    slots: Vec<Slot>,
    /// Indices of freed slots, reused before the arena grows.
    free: Vec<u32>,
    /// Interned node names.
    names: HashMap<String, WeakRef<String>>,
    /// Number of live nodes.
    live: usize,
}

impl DomTree {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by its ID, or `None` if it has been destroyed.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(id).ok_or(DomError::StaleNode(id))
    }

    /// Whether `id` still refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes across all documents.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a node from its payload.
    ///
    /// A Document sets itself as its owner document. Any other node is owned
    /// by `document`, or by nothing when `document` is `None`. The node is not
    /// attached to any tree.
    ///
    /// # Errors
    ///
    /// [`DomError::StaleNode`] if `document` is gone, and
    /// [`DomError::HierarchyRequest`] if it is not a Document.
    pub fn create(&mut self, document: Option<NodeId>, data: NodeData) -> Result<NodeId, DomError> {
        let name = self.intern(data.default_name());
        self.create_named(document, name, data)
    }

    fn create_named(
        &mut self,
        document: Option<NodeId>,
        name: Ref<String>,
        data: NodeData,
    ) -> Result<NodeId, DomError> {
        if let Some(document) = document
            && self.node(document)?.node_type != NodeType::Document
        {
            return Err(DomError::HierarchyRequest("owner is not a document"));
        }

        let node_type = data.node_type();
        let id = self.next_id()?;
        let owner_document = if node_type == NodeType::Document {
            Some(id)
        } else {
            document
        };

        self.slots[id.index as usize].node = Some(Node {
            name,
            node_type,
            data,
            owner_document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        self.live += 1;
        Ok(id)
    }

    /// Reserve a slot, reusing a freed one if possible.
    fn next_id(&mut self) -> Result<NodeId, DomError> {
        if let Some(index) = self.free.pop() {
            let generation = self.slots[index as usize].generation;
            return Ok(NodeId { index, generation });
        }
        let index = u32::try_from(self.slots.len())
            .map_err(|_| DomError::NotSupported("node arena is full"))?;
        self.slots.push(Slot {
            generation: 0,
            node: None,
        });
        Ok(NodeId {
            index,
            generation: 0,
        })
    }

    /// Release the slot of a node whose links have already been cut.
    pub(crate) fn free_slot(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation || slot.node.is_none() {
            return;
        }
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
    }

    /// Share one handle per distinct name.
    fn intern(&mut self, name: &str) -> Ref<String> {
        if let Some(existing) = self.names.get(name).and_then(WeakRef::upgrade) {
            return existing;
        }
        let handle = Ref::new(name.to_owned());
        let _ = self
            .names
            .insert(name.to_owned(), Ref::downgrade(&handle));
        handle
    }

    /// Forget names whose last node has been destroyed.
    pub(crate) fn purge_names(&mut self) {
        self.names.retain(|_, weak| weak.is_live());
    }

    /// Whether some live node currently carries `name`.
    #[must_use]
    pub fn is_name_interned(&self, name: &str) -> bool {
        self.names.get(name).is_some_and(WeakRef::is_live)
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-document)
    ///
    /// Create a new, empty Document.
    ///
    /// # Errors
    ///
    /// Fails only if the arena cannot grow.
    pub fn create_document(&mut self) -> Result<NodeId, DomError> {
        self.create(None, NodeData::Document(DocumentData::default()))
    }

    /// [§ 4.5.1 Interface DOMImplementation](https://dom.spec.whatwg.org/#dom-domimplementation-createdocumenttype)
    ///
    /// Create a doctype owned by `document`.
    ///
    /// # Errors
    ///
    /// See [`DomTree::create`].
    pub fn create_document_type(
        &mut self,
        document: NodeId,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> Result<NodeId, DomError> {
        self.create(
            Some(document),
            NodeData::DocumentType(DocumentTypeData {
                name: name.to_owned(),
                public_id: public_id.to_owned(),
                system_id: system_id.to_owned(),
            }),
        )
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-createdocumentfragment)
    ///
    /// # Errors
    ///
    /// See [`DomTree::create`].
    pub fn create_document_fragment(&mut self, document: NodeId) -> Result<NodeId, DomError> {
        self.create(
            Some(document),
            NodeData::DocumentFragment(DocumentFragmentData::default()),
        )
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// # Errors
    ///
    /// See [`DomTree::create`].
    pub fn create_element(&mut self, document: NodeId, tag_name: &str) -> Result<NodeId, DomError> {
        self.create(
            Some(document),
            NodeData::Element(ElementData {
                tag_name: tag_name.to_owned(),
            }),
        )
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    ///
    /// # Errors
    ///
    /// See [`DomTree::create`].
    pub fn create_text(&mut self, document: NodeId, data: &str) -> Result<NodeId, DomError> {
        self.create(
            Some(document),
            NodeData::CharacterData(CharacterData {
                kind: CharacterDataKind::Text,
                data: data.to_owned(),
            }),
        )
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-createcomment)
    ///
    /// # Errors
    ///
    /// See [`DomTree::create`].
    pub fn create_comment(&mut self, document: NodeId, data: &str) -> Result<NodeId, DomError> {
        self.create(
            Some(document),
            NodeData::CharacterData(CharacterData {
                kind: CharacterDataKind::Comment,
                data: data.to_owned(),
            }),
        )
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-createprocessinginstruction)
    ///
    /// The node's name is its `target`.
    ///
    /// # Errors
    ///
    /// See [`DomTree::create`].
    pub fn create_processing_instruction(
        &mut self,
        document: NodeId,
        target: &str,
        data: &str,
    ) -> Result<NodeId, DomError> {
        let name = self.intern(target);
        self.create_named(
            Some(document),
            name,
            NodeData::CharacterData(CharacterData {
                kind: CharacterDataKind::ProcessingInstruction,
                data: data.to_owned(),
            }),
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The node's type.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    /// The node's `nodeName`.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::name)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-document)
    ///
    /// The node document. A Document is its own owner.
    #[must_use]
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.owner_document)
    }

    /// Whether the node implements `capability`. Destroyed nodes implement
    /// nothing.
    #[must_use]
    pub fn is(&self, id: NodeId, capability: Capability) -> bool {
        self.get(id).is_some_and(|n| n.is(capability))
    }

    /// Get document data if this node is a Document.
    #[must_use]
    pub fn as_document(&self, id: NodeId) -> Option<&DocumentData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Document(data) => Some(data),
            _ => None,
        })
    }

    /// Get doctype data if this node is a `DocumentType`.
    #[must_use]
    pub fn as_document_type(&self, id: NodeId) -> Option<&DocumentTypeData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::DocumentType(data) => Some(data),
            _ => None,
        })
    }

    /// Get fragment data if this node is a `DocumentFragment`.
    #[must_use]
    pub fn as_document_fragment(&self, id: NodeId) -> Option<&DocumentFragmentData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::DocumentFragment(data) => Some(data),
            _ => None,
        })
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get the character data of a Text, Comment or `ProcessingInstruction`.
    #[must_use]
    pub fn as_character_data(&self, id: NodeId) -> Option<&CharacterData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::CharacterData(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.as_character_data(id)
            .filter(|data| data.kind == CharacterDataKind::Text)
            .map(|data| data.data.as_str())
    }

    /// [§ 3.1.1 Document title](https://html.spec.whatwg.org/multipage/dom.html#document.title)
    ///
    /// The stored title of a Document.
    #[must_use]
    pub fn title(&self, document: NodeId) -> Option<&str> {
        self.as_document(document).map(|data| data.title.as_str())
    }

    /// The quirks mode of a Document.
    #[must_use]
    pub fn quirks_mode(&self, document: NodeId) -> Option<QuirksMode> {
        self.as_document(document).map(|data| data.mode)
    }

    fn document_data_mut(&mut self, document: NodeId) -> Result<&mut DocumentData, DomError> {
        match &mut self.node_mut(document)?.data {
            NodeData::Document(data) => Ok(data),
            _ => Err(DomError::NotSupported("node is not a document")),
        }
    }

    /// Replace a Document's title.
    ///
    /// # Errors
    ///
    /// [`DomError::StaleNode`] or [`DomError::NotSupported`] if `document`
    /// is not a live Document.
    pub fn set_title(&mut self, document: NodeId, title: &str) -> Result<(), DomError> {
        title.clone_into(&mut self.document_data_mut(document)?.title);
        Ok(())
    }

    /// Set a Document's quirks mode.
    ///
    /// # Errors
    ///
    /// [`DomError::StaleNode`] or [`DomError::NotSupported`] if `document`
    /// is not a live Document.
    pub fn set_quirks_mode(&mut self, document: NodeId, mode: QuirksMode) -> Result<(), DomError> {
        self.document_data_mut(document)?.mode = mode;
        Ok(())
    }
}
