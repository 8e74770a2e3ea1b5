//! Property tests: arbitrary sequences of tree operations never break the
//! parent/children/sibling/owner invariants, whether they succeed or fail.

#![allow(clippy::needless_pass_by_value)]

use koala_dom::{DomTree, NodeId};
use quickcheck_macros::quickcheck;

/// A small pool of nodes spread across two documents.
fn pool() -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let mut nodes = Vec::new();
    for _ in 0..2 {
        let document = tree.create_document().expect("document");
        nodes.push(document);
        for tag in ["html", "body", "p", "span"] {
            nodes.push(tree.create_element(document, tag).expect("element"));
        }
        nodes.push(tree.create_text(document, "text").expect("text"));
        nodes.push(tree.create_comment(document, "comment").expect("comment"));
        nodes.push(tree.create_document_fragment(document).expect("fragment"));
        nodes.push(
            tree.create_document_type(document, "html", "", "")
                .expect("doctype"),
        );
    }
    (tree, nodes)
}

fn pick(nodes: &[NodeId], raw: u8) -> NodeId {
    nodes[usize::from(raw) % nodes.len()]
}

/// Apply one encoded operation, ignoring whether it was rejected.
fn apply(tree: &mut DomTree, nodes: &[NodeId], (op, a, b, c): (u8, u8, u8, u8)) {
    let raw_c = c;
    let (a, b, c) = (pick(nodes, a), pick(nodes, b), pick(nodes, c));
    match op % 6 {
        0 | 1 => {
            let _ = tree.append_child(a, b);
        }
        2 => {
            let _ = tree.insert_before(a, b, Some(c));
        }
        3 => {
            let _ = tree.remove(a);
        }
        4 => {
            let _ = tree.adopt_node(a, b);
        }
        _ => {
            // Destroy rarely, so most runs keep building.
            if raw_c % 4 == 0 {
                let _ = tree.destroy(a);
            }
        }
    }
}

#[quickcheck]
fn prop_invariants_hold_after_every_operation(ops: Vec<(u8, u8, u8, u8)>) -> bool {
    let (mut tree, nodes) = pool();
    for op in ops {
        apply(&mut tree, &nodes, op);
        if let Err(violation) = tree.check_tree_invariants() {
            eprintln!("{violation}");
            return false;
        }
    }
    true
}

#[quickcheck]
fn prop_failed_operations_leave_tree_unchanged(ops: Vec<(u8, u8, u8, u8)>, probe: (u8, u8, u8)) -> bool {
    let (mut tree, nodes) = pool();
    for op in ops {
        apply(&mut tree, &nodes, op);
    }

    let snapshot = |tree: &DomTree| -> Vec<(Option<NodeId>, Vec<NodeId>, Option<NodeId>)> {
        nodes
            .iter()
            .map(|&id| (tree.parent(id), tree.children(id).to_vec(), tree.owner_document(id)))
            .collect()
    };

    let before = snapshot(&tree);
    let (parent, node, child) = (pick(&nodes, probe.0), pick(&nodes, probe.1), pick(&nodes, probe.2));
    match tree.insert_before(parent, node, Some(child)) {
        Ok(_) => true,
        Err(_) => snapshot(&tree) == before,
    }
}

#[quickcheck]
fn prop_append_then_last_child(raw_parent: u8, raw_node: u8) -> bool {
    let (mut tree, nodes) = pool();
    let (parent, node) = (pick(&nodes, raw_parent), pick(&nodes, raw_node));
    match tree.append_child(parent, node) {
        // A fragment hands over its children instead of itself.
        Ok(_) if tree.node_type(node) == Some(koala_dom::NodeType::DocumentFragment) => true,
        Ok(inserted) => tree.last_child(parent) == Some(inserted),
        Err(_) => true,
    }
}
