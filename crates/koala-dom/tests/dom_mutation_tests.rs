//! Tests for DOM tree mutation methods: `remove_child`, `insert_before`,
//! fragment insertion, `destroy`, and the pre-insert validity checks.

use koala_dom::{Capability, DomError, DomTree, NodeId, NodeType};

/// Create a document with a `div` document element.
fn setup() -> (DomTree, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let document = tree.create_document().expect("document");
    let root = tree.create_element(document, "div").expect("element");
    let _ = tree.append_child(document, root).expect("append root");
    (tree, document, root)
}

/// Helper to create an element node and return its `NodeId`.
fn element(tree: &mut DomTree, document: NodeId, tag: &str) -> NodeId {
    tree.create_element(document, tag).expect("element")
}

fn append(tree: &mut DomTree, parent: NodeId, child: NodeId) {
    let _ = tree.append_child(parent, child).expect("append");
}

// ========== append_child ==========

#[test]
fn test_append_child_becomes_last_child() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");

    assert_eq!(tree.append_child(parent, a), Ok(a));
    assert_eq!(tree.last_child(parent), Some(a));
    assert_eq!(tree.append_child(parent, b), Ok(b));
    assert_eq!(tree.last_child(parent), Some(b));

    assert_eq!(tree.first_child(parent), Some(a));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.parent(b), Some(parent));
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_append_existing_child_moves_it_to_end() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);

    append(&mut tree, parent, a);

    assert_eq!(tree.children(parent), &[b, a]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(a), None);
    tree.check_tree_invariants().expect("invariants");
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let (mut tree, document, parent) = setup();
    let child = element(&mut tree, document, "p");
    append(&mut tree, parent, child);

    assert_eq!(tree.children(parent).len(), 1);

    assert_eq!(tree.remove_child(parent, child), Ok(child));

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
    // Removal detaches, it doesn't free.
    assert!(tree.is_alive(child));
}

#[test]
fn test_remove_child_first_of_three() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    let c = element(&mut tree, document, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);
    append(&mut tree, parent, c);

    let _ = tree.remove_child(parent, a).expect("remove");

    // b is now first child, c is second
    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_remove_child_middle_of_three() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    let c = element(&mut tree, document, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);
    append(&mut tree, parent, c);

    let _ = tree.remove_child(parent, b).expect("remove");

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_last_of_three() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    let c = element(&mut tree, document, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);
    append(&mut tree, parent, c);

    let _ = tree.remove_child(parent, c).expect("remove");

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_remove_child_of_other_parent_is_not_found() {
    let (mut tree, document, parent) = setup();
    let other = element(&mut tree, document, "section");
    let child = element(&mut tree, document, "p");
    append(&mut tree, other, child);

    assert!(matches!(
        tree.remove_child(parent, child),
        Err(DomError::NotFound(_))
    ));
    assert_eq!(tree.parent(child), Some(other));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let (mut tree, document, parent) = setup();
    let existing = element(&mut tree, document, "b");
    append(&mut tree, parent, existing);

    let new_child = element(&mut tree, document, "a");
    let _ = tree
        .insert_before(parent, new_child, Some(existing))
        .expect("insert");

    // new_child should be first, existing second
    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let c = element(&mut tree, document, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, c);

    let b = element(&mut tree, document, "b");
    let _ = tree.insert_before(parent, b, Some(c)).expect("insert");

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_insert_before_itself_keeps_position() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    let c = element(&mut tree, document, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);
    append(&mut tree, parent, c);

    let _ = tree.insert_before(parent, b, Some(b)).expect("insert");

    assert_eq!(tree.children(parent), &[a, b, c]);
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_insert_ancestor_is_rejected() {
    let (mut tree, document, parent) = setup();
    let child = element(&mut tree, document, "p");
    let grandchild = element(&mut tree, document, "span");
    append(&mut tree, parent, child);
    append(&mut tree, child, grandchild);

    assert!(matches!(
        tree.append_child(grandchild, parent),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(matches!(
        tree.append_child(child, child),
        Err(DomError::HierarchyRequest(_))
    ));
    // Nothing moved.
    assert_eq!(tree.parent(parent), Some(document));
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_insert_before_foreign_child_is_not_found() {
    let (mut tree, document, parent) = setup();
    let stranger = element(&mut tree, document, "p");
    let node = element(&mut tree, document, "span");

    assert!(matches!(
        tree.insert_before(parent, node, Some(stranger)),
        Err(DomError::NotFound(_))
    ));
    assert_eq!(tree.parent(node), None);
}

#[test]
fn test_cycle_check_precedes_child_check() {
    let (mut tree, document, parent) = setup();
    let child = element(&mut tree, document, "p");
    let stranger = element(&mut tree, document, "span");
    append(&mut tree, parent, child);

    // Both checks fail here; the ancestor check is reported.
    assert!(matches!(
        tree.insert_before(child, parent, Some(stranger)),
        Err(DomError::HierarchyRequest(_))
    ));
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_character_data_cannot_have_children() {
    let (mut tree, document, parent) = setup();
    let text = tree.create_text(document, "hi").expect("text");
    append(&mut tree, parent, text);
    let child = element(&mut tree, document, "b");

    assert!(matches!(
        tree.append_child(text, child),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_document_child_constraints() {
    let mut tree = DomTree::new();
    let document = tree.create_document().expect("document");
    let doctype = tree
        .create_document_type(document, "html", "", "")
        .expect("doctype");
    let html = element(&mut tree, document, "html");
    let second = element(&mut tree, document, "body");
    let text = tree.create_text(document, "x").expect("text");
    let other_document = tree.create_document().expect("document");

    append(&mut tree, document, html);

    // Only one element child.
    assert!(matches!(
        tree.append_child(document, second),
        Err(DomError::HierarchyRequest(_))
    ));
    // No text directly under a document.
    assert!(matches!(
        tree.append_child(document, text),
        Err(DomError::HierarchyRequest(_))
    ));
    // A doctype can't come after the element.
    assert!(matches!(
        tree.append_child(document, doctype),
        Err(DomError::HierarchyRequest(_))
    ));
    // Documents are never children.
    assert!(matches!(
        tree.append_child(html, other_document),
        Err(DomError::HierarchyRequest(_))
    ));

    let _ = tree
        .insert_before(document, doctype, Some(html))
        .expect("doctype before element");
    assert_eq!(tree.children(document), &[doctype, html]);

    // Doctype only ever under a document.
    let stray = tree
        .create_document_type(document, "html", "", "")
        .expect("doctype");
    assert!(matches!(
        tree.append_child(html, stray),
        Err(DomError::HierarchyRequest(_))
    ));
    tree.check_tree_invariants().expect("invariants");
}

// ========== DocumentFragment ==========

#[test]
fn test_fragment_insertion_moves_children_and_empties_fragment() {
    let (mut tree, document, parent) = setup();
    let existing = element(&mut tree, document, "x");
    append(&mut tree, parent, existing);

    let fragment = tree.create_document_fragment(document).expect("fragment");
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    let c = tree.create_text(document, "c").expect("text");
    append(&mut tree, fragment, a);
    append(&mut tree, fragment, b);
    append(&mut tree, fragment, c);

    assert_eq!(
        tree.insert_before(parent, fragment, Some(existing)),
        Ok(fragment)
    );

    assert_eq!(tree.children(parent), &[a, b, c, existing]);
    assert!(tree.children(fragment).is_empty());
    assert_eq!(tree.parent(fragment), None);
    assert_eq!(tree.parent(a), Some(parent));
    assert_eq!(tree.next_sibling(c), Some(existing));
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_fragment_insertion_equals_sequential_insertion() {
    let build = |via_fragment: bool| {
        let (mut tree, document, parent) = setup();
        let names = ["a", "b", "c", "d"];
        let nodes: Vec<NodeId> = names
            .iter()
            .map(|name| element(&mut tree, document, name))
            .collect();
        if via_fragment {
            let fragment = tree.create_document_fragment(document).expect("fragment");
            for &n in &nodes {
                append(&mut tree, fragment, n);
            }
            append(&mut tree, parent, fragment);
        } else {
            for &n in &nodes {
                append(&mut tree, parent, n);
            }
        }
        tree.children(parent)
            .iter()
            .map(|&id| tree.name(id).unwrap_or_default().to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(build(true), build(false));
}

#[test]
fn test_empty_fragment_insertion_is_noop() {
    let (mut tree, document, parent) = setup();
    let fragment = tree.create_document_fragment(document).expect("fragment");

    assert_eq!(tree.append_child(parent, fragment), Ok(fragment));
    assert!(tree.children(parent).is_empty());
}

#[test]
fn test_fragment_with_two_elements_rejected_under_document() {
    let mut tree = DomTree::new();
    let document = tree.create_document().expect("document");
    let fragment = tree.create_document_fragment(document).expect("fragment");
    let a = element(&mut tree, document, "a");
    let b = element(&mut tree, document, "b");
    append(&mut tree, fragment, a);
    append(&mut tree, fragment, b);

    assert!(matches!(
        tree.append_child(document, fragment),
        Err(DomError::HierarchyRequest(_))
    ));
    // Rejected before anything moved.
    assert_eq!(tree.children(fragment), &[a, b]);
}

// ========== destroy ==========

#[test]
fn test_destroy_frees_subtree_and_reports_stale_ids() {
    let (mut tree, document, parent) = setup();
    let child = element(&mut tree, document, "section");
    let grandchild = tree.create_text(document, "bye").expect("text");
    let sibling = element(&mut tree, document, "aside");
    append(&mut tree, parent, child);
    append(&mut tree, child, grandchild);
    append(&mut tree, parent, sibling);
    let live_before = tree.len();

    tree.destroy(child).expect("destroy");

    assert!(!tree.is_alive(child));
    assert!(!tree.is_alive(grandchild));
    assert_eq!(tree.len(), live_before - 2);
    assert_eq!(tree.children(parent), &[sibling]);
    assert_eq!(tree.prev_sibling(sibling), None);
    assert_eq!(tree.node_type(child), None);
    assert_eq!(tree.destroy(child), Err(DomError::StaleNode(child)));
    assert!(matches!(
        tree.append_child(parent, grandchild),
        Err(DomError::StaleNode(_))
    ));
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_reused_slot_does_not_revive_old_id() {
    let (mut tree, document, _parent) = setup();
    let old = element(&mut tree, document, "old");
    tree.destroy(old).expect("destroy");

    let new = element(&mut tree, document, "new");

    assert_eq!(old.index(), new.index());
    assert_ne!(old, new);
    assert!(!tree.is_alive(old));
    assert_eq!(tree.name(new), Some("new"));
}

#[test]
fn test_names_are_shared_and_released() {
    let (mut tree, document, parent) = setup();
    let a = element(&mut tree, document, "custom-tag");
    let b = element(&mut tree, document, "custom-tag");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);

    let (Some(node_a), Some(node_b)) = (tree.get(a), tree.get(b)) else {
        panic!("nodes alive");
    };
    assert!(koala_std::Ref::ptr_eq(node_a.name_handle(), node_b.name_handle()));
    assert!(tree.is_name_interned("custom-tag"));

    tree.destroy(a).expect("destroy");
    assert!(tree.is_name_interned("custom-tag"));
    tree.destroy(b).expect("destroy");
    assert!(!tree.is_name_interned("custom-tag"));
}

// ========== Queries ==========

#[test]
fn test_descendants_pre_order() {
    let (mut tree, document, root) = setup();
    let a = element(&mut tree, document, "a");
    let a1 = element(&mut tree, document, "a1");
    let a2 = element(&mut tree, document, "a2");
    let b = element(&mut tree, document, "b");
    append(&mut tree, root, a);
    append(&mut tree, a, a1);
    append(&mut tree, a, a2);
    append(&mut tree, root, b);

    assert_eq!(tree.descendants(root, true), vec![root, a, a1, a2, b]);
    assert_eq!(tree.descendants(root, false), vec![a, a1, a2, b]);
    assert_eq!(tree.descendants(a2, false), Vec::<NodeId>::new());
    assert_eq!(tree.root_of(a2), document);
    assert_eq!(tree.ancestors(a2).collect::<Vec<_>>(), vec![a, root, document]);
    assert!(tree.is_inclusive_ancestor(root, a1));
    assert!(tree.is_inclusive_ancestor(a1, a1));
    assert!(!tree.is_inclusive_ancestor(b, a1));
}

#[test]
fn test_text_content_and_append_data() {
    let (mut tree, document, root) = setup();
    let hello = tree.create_text(document, "Hello").expect("text");
    let em = element(&mut tree, document, "em");
    let world = tree.create_text(document, " world").expect("text");
    let comment = tree.create_comment(document, "ignored").expect("comment");
    append(&mut tree, root, hello);
    append(&mut tree, root, em);
    append(&mut tree, em, world);
    append(&mut tree, root, comment);

    tree.append_data(world, "!").expect("append data");

    assert_eq!(tree.text_content(root).as_deref(), Some("Hello world!"));
    assert_eq!(tree.text_content(comment).as_deref(), Some("ignored"));
    assert_eq!(tree.text_content(document), None);
    assert!(matches!(
        tree.append_data(em, "x"),
        Err(DomError::NotSupported(_))
    ));
}

#[test]
fn test_node_names_and_capabilities() {
    let mut tree = DomTree::new();
    let document = tree.create_document().expect("document");
    let doctype = tree
        .create_document_type(document, "html", "", "")
        .expect("doctype");
    let fragment = tree.create_document_fragment(document).expect("fragment");
    let text = tree.create_text(document, "t").expect("text");
    let comment = tree.create_comment(document, "c").expect("comment");
    let pi = tree
        .create_processing_instruction(document, "xml-stylesheet", "href=a.css")
        .expect("pi");

    assert_eq!(tree.name(document), Some("#document"));
    assert_eq!(tree.name(doctype), Some("html"));
    assert_eq!(tree.name(fragment), Some("#document-fragment"));
    assert_eq!(tree.name(text), Some("#text"));
    assert_eq!(tree.name(comment), Some("#comment"));
    assert_eq!(tree.name(pi), Some("xml-stylesheet"));

    assert_eq!(tree.node_type(pi), Some(NodeType::ProcessingInstruction));
    assert_eq!(NodeType::DocumentFragment.code(), 11);
    for id in [text, comment, pi] {
        assert!(tree.is(id, Capability::CharacterData));
        assert!(tree.as_character_data(id).is_some());
    }
    assert!(!tree.is(doctype, Capability::CharacterData));
    assert!(tree.is(fragment, Capability::ParentNode));
    assert!(tree.as_element(text).is_none());
    assert_eq!(tree.as_text(text), Some("t"));
    assert_eq!(tree.as_text(comment), None);
    assert_eq!(tree.owner_document(document), Some(document));
    assert_eq!(tree.owner_document(pi), Some(document));
}

#[test]
fn test_create_with_non_document_owner_rejected() {
    let (mut tree, _document, root) = setup();
    assert!(matches!(
        tree.create_element(root, "p"),
        Err(DomError::HierarchyRequest(_))
    ));
}
