//! Selection flattening

use crate::host::DocumentHost;
use reskin_core::NodeId;
use rustc_hash::FxHashSet;

/// Depth-first pre-order list of visible nodes under `roots`
///
/// Children are only walked through container kinds. A hidden node removes its
/// whole subtree. Each node appears once, even if reachable along several paths.
pub fn flatten_nodes<H: DocumentHost + ?Sized>(host: &H, roots: &[NodeId]) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();

    for root in roots {
        visit(host, root, &mut seen, &mut out);
    }

    out
}

/// Flatten the host's current selection
pub fn flatten_selection<H: DocumentHost + ?Sized>(host: &H) -> Vec<NodeId> {
    let nodes = flatten_nodes(host, &host.selection());
    tracing::debug!("flatten_selection: {} visible nodes", nodes.len());
    nodes
}

fn visit<H: DocumentHost + ?Sized>(
    host: &H,
    id: &NodeId,
    seen: &mut FxHashSet<NodeId>,
    out: &mut Vec<NodeId>,
) {
    let Some(node) = host.node(id) else {
        tracing::debug!("flatten: skipping unknown node {}", id);
        return;
    };
    if !node.visible || !seen.insert(node.id.clone()) {
        return;
    }

    out.push(node.id.clone());

    if node.kind.is_container() {
        for child in &node.children {
            visit(host, child, seen, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NodeKind;
    use crate::memory::{DocumentSnapshot, MemoryDocument, NodeRecord};

    fn ids(nodes: &[NodeId]) -> Vec<&str> {
        nodes.iter().map(NodeId::as_str).collect()
    }

    fn roots(names: &[&str]) -> Vec<NodeId> {
        names.iter().copied().map(NodeId::from).collect()
    }

    // page
    // ├── header (frame)
    // │   ├── logo
    // │   └── title (text)
    // ├── icon (boolean op)
    // │   └── stroke
    // └── footer (hidden frame)
    //     └── legal
    fn document() -> MemoryDocument {
        MemoryDocument::new(DocumentSnapshot {
            nodes: vec![
                NodeRecord::new("page", "Page", NodeKind::Frame).with_children(["header", "icon", "footer"]),
                NodeRecord::new("header", "Header", NodeKind::Frame).with_children(["logo", "title"]),
                NodeRecord::new("logo", "Logo", NodeKind::Rectangle),
                NodeRecord::new("title", "Title", NodeKind::Text),
                NodeRecord::new("icon", "Icon", NodeKind::BooleanOperation).with_children(["stroke"]),
                NodeRecord::new("stroke", "Stroke", NodeKind::Vector),
                NodeRecord::new("footer", "Footer", NodeKind::Frame)
                    .with_children(["legal"])
                    .hidden(),
                NodeRecord::new("legal", "Legal", NodeKind::Text),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn walks_pre_order_in_sibling_order() {
        let doc = document();
        let nodes = flatten_nodes(&doc, &roots(&["page"]));
        assert_eq!(ids(&nodes), vec!["page", "header", "logo", "title", "icon"]);
    }

    #[test]
    fn selected_child_appears_once() {
        let doc = document();

        let nodes = flatten_nodes(&doc, &roots(&["page", "logo"]));
        assert_eq!(ids(&nodes), vec!["page", "header", "logo", "title", "icon"]);

        let nodes = flatten_nodes(&doc, &roots(&["title", "header"]));
        assert_eq!(ids(&nodes), vec!["title", "header", "logo"]);
    }

    #[test]
    fn non_container_children_are_not_walked() {
        let doc = document();
        let nodes = flatten_nodes(&doc, &roots(&["icon"]));
        assert_eq!(ids(&nodes), vec!["icon"]);
    }

    #[test]
    fn hidden_root_removes_its_subtree() {
        let doc = document();
        assert!(flatten_nodes(&doc, &roots(&["footer"])).is_empty());

        let nodes = flatten_nodes(&doc, &roots(&["footer", "logo", "missing"]));
        assert_eq!(ids(&nodes), vec!["logo"]);
    }

    #[test]
    fn selection_is_flattened() {
        let doc = document();
        doc.set_selection(roots(&["header"]));
        assert_eq!(ids(&flatten_selection(&doc)), vec!["header", "logo", "title"]);
    }
}
