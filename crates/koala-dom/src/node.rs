//! Node storage: identifiers, the closed set of node variants, and the
//! capability predicates derived from them.

use std::fmt;

use koala_std::Ref;
use strum_macros::{Display, IntoStaticStr};

/// A generational index into a [`DomTree`](crate::DomTree).
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node without borrowing issues. The
/// generation changes every time a slot is freed, so an id held across
/// [`DomTree::destroy`](crate::DomTree::destroy) reports the node as gone
/// instead of aliasing whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Position of the slot in the arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was handed out.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#dom-node-nodetype)
///
/// "Each node has an associated node type". The discriminants are the
/// `nodeType` constants; a node's type is fixed when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[repr(u16)]
pub enum NodeType {
    /// `ELEMENT_NODE`
    Element = 1,
    /// `TEXT_NODE`
    Text = 3,
    /// `PROCESSING_INSTRUCTION_NODE`
    ProcessingInstruction = 7,
    /// `COMMENT_NODE`
    Comment = 8,
    /// `DOCUMENT_NODE`
    Document = 9,
    /// `DOCUMENT_TYPE_NODE`
    DocumentType = 10,
    /// `DOCUMENT_FRAGMENT_NODE`
    DocumentFragment = 11,
}

impl NodeType {
    /// The numeric `nodeType` value.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// An interface a node may implement, tested against its [`NodeType`].
///
/// Capability tests never inspect payloads; they are a pure function of the
/// node type, so a node's capabilities can't change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Capability {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element,
    /// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
    ///
    /// Satisfied by Text, Comment and `ProcessingInstruction` nodes.
    CharacterData,
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text,
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment,
    /// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
    ProcessingInstruction,
    /// [§ 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#interface-parentnode)
    ///
    /// Documents, document fragments and elements: the only nodes that may
    /// have children.
    ParentNode,
}

impl Capability {
    /// Whether a node of type `node_type` implements this capability.
    #[must_use]
    pub const fn satisfied_by(self, node_type: NodeType) -> bool {
        match self {
            Self::Document => matches!(node_type, NodeType::Document),
            Self::DocumentType => matches!(node_type, NodeType::DocumentType),
            Self::DocumentFragment => matches!(node_type, NodeType::DocumentFragment),
            Self::Element => matches!(node_type, NodeType::Element),
            Self::CharacterData => matches!(
                node_type,
                NodeType::Text | NodeType::Comment | NodeType::ProcessingInstruction
            ),
            Self::Text => matches!(node_type, NodeType::Text),
            Self::Comment => matches!(node_type, NodeType::Comment),
            Self::ProcessingInstruction => matches!(node_type, NodeType::ProcessingInstruction),
            Self::ParentNode => matches!(
                node_type,
                NodeType::Document | NodeType::DocumentFragment | NodeType::Element
            ),
        }
    }
}

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum QuirksMode {
    /// "Unless stated otherwise, a document's mode is "no-quirks"."
    #[default]
    NoQuirks,
    /// Set when the DOCTYPE is missing or forces quirks.
    Quirks,
    /// Set for a handful of transitional public identifiers.
    LimitedQuirks,
}

/// Document-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentData {
    /// Document title, written by the tree builder once `<title>` closes.
    pub title: String,
    /// "Each document has an associated mode"
    pub mode: QuirksMode,
}

/// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
///
/// "Doctypes have an associated name, public ID, and system ID."
/// Missing DOCTYPE token fields are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeData {
    /// "name"
    pub name: String,
    /// "public ID"
    pub public_id: String,
    /// "system ID"
    pub system_id: String,
}

/// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
///
/// "A DocumentFragment node has an associated host (null or an element in a
/// different node tree). It is null unless otherwise stated."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentFragmentData {
    /// "host"
    pub host: Option<NodeId>,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
///
/// NOTE: Only the local name is kept. Attributes and namespaces are not
/// modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
}

/// Which `CharacterData` interface a node implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CharacterDataKind {
    /// "Text nodes are known as text."
    Text,
    /// "Comment nodes are known as comments."
    Comment,
    /// [§ 4.13](https://dom.spec.whatwg.org/#interface-processinginstruction)
    /// "ProcessingInstruction nodes have an associated target." The target
    /// is the node's name.
    ProcessingInstruction,
}

/// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
///
/// "Each node inheriting from the CharacterData interface has an associated
/// mutable string called data."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterData {
    /// Concrete interface of the node.
    pub kind: CharacterDataKind,
    /// "data"
    pub data: String,
}

/// The closed set of node payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document(DocumentData),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType(DocumentTypeData),
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment(DocumentFragmentData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// Text, Comment and `ProcessingInstruction` nodes.
    CharacterData(CharacterData),
}

impl NodeData {
    /// The node type this payload produces.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Document(_) => NodeType::Document,
            Self::DocumentType(_) => NodeType::DocumentType,
            Self::DocumentFragment(_) => NodeType::DocumentFragment,
            Self::Element(_) => NodeType::Element,
            Self::CharacterData(data) => match data.kind {
                CharacterDataKind::Text => NodeType::Text,
                CharacterDataKind::Comment => NodeType::Comment,
                CharacterDataKind::ProcessingInstruction => NodeType::ProcessingInstruction,
            },
        }
    }

    /// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#dom-node-nodename)
    ///
    /// The `nodeName` for this payload. Processing instructions take their
    /// target as the name, so it is passed in separately.
    pub(crate) fn default_name(&self) -> &str {
        match self {
            Self::Document(_) => "#document",
            Self::DocumentType(doctype) => &doctype.name,
            Self::DocumentFragment(_) => "#document-fragment",
            Self::Element(element) => &element.tag_name,
            Self::CharacterData(data) => match data.kind {
                CharacterDataKind::Text => "#text",
                CharacterDataKind::Comment => "#comment",
                CharacterDataKind::ProcessingInstruction => "",
            },
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction. The children list is the only
/// owning relation; every other link is a plain id.
#[derive(Debug, Clone)]
pub struct Node {
    /// Interned `nodeName`, shared with every other node of the same name.
    pub(crate) name: Ref<String>,

    /// "Each node has an associated node type"
    pub(crate) node_type: NodeType,

    /// Variant payload; always agrees with `node_type`.
    pub(crate) data: NodeData,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-document)
    /// "Each node has an associated node document, set upon creation, that
    /// is a document." Documents point at themselves. `None` only for nodes
    /// created without a target document.
    pub(crate) owner_document: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub(crate) parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub(crate) children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub(crate) next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub(crate) prev_sibling: Option<NodeId>,
}

impl Node {
    /// The node's `nodeName`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The shared handle behind [`Node::name`].
    #[must_use]
    pub const fn name_handle(&self) -> &Ref<String> {
        &self.name
    }

    /// The node's type.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// The node's variant payload.
    #[must_use]
    pub const fn data(&self) -> &NodeData {
        &self.data
    }

    /// The document that owns this node.
    #[must_use]
    pub const fn owner_document(&self) -> Option<NodeId> {
        self.owner_document
    }

    /// The node's parent, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's children in tree order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The next sibling, if any.
    #[must_use]
    pub const fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// The previous sibling, if any.
    #[must_use]
    pub const fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    /// Whether this node implements `capability`.
    #[must_use]
    pub const fn is(&self, capability: Capability) -> bool {
        capability.satisfied_by(self.node_type)
    }
}
