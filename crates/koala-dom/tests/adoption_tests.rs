//! Tests for moving nodes between documents.

use koala_dom::{DomError, DomTree, NodeId};

/// Two documents in one arena, plus a three-node subtree owned by the first.
fn two_documents() -> (DomTree, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let first = tree.create_document().expect("document");
    let second = tree.create_document().expect("document");

    let section = tree.create_element(first, "section").expect("element");
    let heading = tree.create_element(first, "h1").expect("element");
    let text = tree.create_text(first, "title").expect("text");
    let _ = tree.append_child(section, heading).expect("append");
    let _ = tree.append_child(heading, text).expect("append");
    (tree, first, second, section)
}

#[test]
fn test_adopt_repoints_every_inclusive_descendant() {
    let (mut tree, first, second, section) = two_documents();
    for id in tree.descendants(section, true) {
        assert_eq!(tree.owner_document(id), Some(first));
    }

    assert_eq!(tree.adopt_node(second, section), Ok(section));

    for id in tree.descendants(section, true) {
        assert_eq!(tree.owner_document(id), Some(second));
    }
    assert_eq!(tree.descendants(section, true).len(), 3);
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_adopt_into_current_document_keeps_owner() {
    let (mut tree, first, _second, section) = two_documents();
    let before: Vec<_> = tree
        .descendants(section, true)
        .into_iter()
        .map(|id| tree.owner_document(id))
        .collect();

    let _ = tree.adopt_node(first, section).expect("adopt");

    let after: Vec<_> = tree
        .descendants(section, true)
        .into_iter()
        .map(|id| tree.owner_document(id))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_adopt_removes_node_from_old_parent() {
    let (mut tree, first, second, section) = two_documents();
    let html = tree.create_element(first, "html").expect("element");
    let _ = tree.append_child(first, html).expect("append");
    let _ = tree.append_child(html, section).expect("append");

    let _ = tree.adopt_node(second, section).expect("adopt");

    assert_eq!(tree.parent(section), None);
    assert!(tree.children(html).is_empty());
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_insertion_into_other_document_adopts() {
    let (mut tree, _first, second, section) = two_documents();
    let body = tree.create_element(second, "body").expect("element");
    let _ = tree.append_child(second, body).expect("append");

    let _ = tree.append_child(body, section).expect("append");

    for id in tree.descendants(section, true) {
        assert_eq!(tree.owner_document(id), Some(second));
    }
    assert_eq!(tree.root_of(section), second);
    tree.check_tree_invariants().expect("invariants");
}

#[test]
fn test_adopting_a_document_is_not_supported() {
    let (mut tree, first, second, _section) = two_documents();
    assert!(matches!(
        tree.adopt_node(second, first),
        Err(DomError::NotSupported(_))
    ));
}

#[test]
fn test_adopting_hosted_fragment_is_rejected() {
    let (mut tree, first, second, _section) = two_documents();
    let template = tree.create_element(first, "template").expect("element");
    let contents = tree.create_document_fragment(first).expect("fragment");
    tree.set_fragment_host(contents, Some(template))
        .expect("bind host");
    assert_eq!(
        tree.as_document_fragment(contents).and_then(|f| f.host),
        Some(template)
    );

    assert!(matches!(
        tree.adopt_node(second, contents),
        Err(DomError::HierarchyRequest(_))
    ));
    assert_eq!(tree.owner_document(contents), Some(first));

    // Unbound fragments adopt normally.
    tree.set_fragment_host(contents, None).expect("unbind host");
    assert_eq!(tree.adopt_node(second, contents), Ok(contents));
    assert_eq!(tree.owner_document(contents), Some(second));
}

#[test]
fn test_adopt_into_non_document_rejected() {
    let (mut tree, first, _second, section) = two_documents();
    let other = tree.create_element(first, "div").expect("element");
    assert!(matches!(
        tree.adopt_node(other, section),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_fragment_host_must_be_element() {
    let (mut tree, first, _second, _section) = two_documents();
    let fragment = tree.create_document_fragment(first).expect("fragment");
    let text = tree.create_text(first, "x").expect("text");
    assert!(matches!(
        tree.set_fragment_host(fragment, Some(text)),
        Err(DomError::NotSupported(_))
    ));
}

#[test]
fn test_unowned_node_adopted_on_insertion() {
    let mut tree = DomTree::new();
    let document = tree.create_document().expect("document");
    let html = tree.create_element(document, "html").expect("element");
    let _ = tree.append_child(document, html).expect("append");

    let loose = tree
        .create(
            None,
            koala_dom::NodeData::Element(koala_dom::ElementData {
                tag_name: "p".to_string(),
            }),
        )
        .expect("create");
    assert_eq!(tree.owner_document(loose), None);

    let _ = tree.append_child(html, loose).expect("append");
    assert_eq!(tree.owner_document(loose), Some(document));
}

#[test]
fn test_title_and_quirks_mode_live_on_the_document() {
    let (mut tree, first, second, section) = two_documents();
    tree.set_title(first, "First").expect("title");
    tree.set_quirks_mode(second, koala_dom::QuirksMode::Quirks)
        .expect("mode");

    assert_eq!(tree.title(first), Some("First"));
    assert_eq!(tree.title(second), Some(""));
    assert_eq!(tree.quirks_mode(second), Some(koala_dom::QuirksMode::Quirks));
    assert_eq!(tree.quirks_mode(first), Some(koala_dom::QuirksMode::NoQuirks));
    assert!(tree.set_title(section, "nope").is_err());
}
