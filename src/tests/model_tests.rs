#[cfg(test)]
mod tests {
    use crate::models::*;
    use crate::services::{SessionRegistry, TabSession, TextBuffer};
    use crate::tests::fakes::{file_entry, folder_entry};

    #[test]
    fn test_tab_id_matches_string_hash() {
        assert_eq!(TabId::of("").value(), 0);
        assert_eq!(TabId::of("a").value(), 97);
        assert_eq!(TabId::of("ab").value(), 3105);
        assert_eq!(TabId::of("hello").value(), 99162322);
        // Long paths wrap around instead of overflowing
        let long = "workspace/slapos/software/erp5/instance-zope.cfg.in";
        assert_eq!(TabId::of(long), TabId::of(long));
    }

    #[test]
    fn test_colliding_paths_get_distinct_tabs() {
        assert_eq!(TabId::of("Aa"), TabId::of("BB"));

        let mut registry = SessionRegistry::new();
        let first = registry.allocate_id("Aa");
        registry.insert(TabSession::loading(first, "Aa", Box::new(TextBuffer::default())));
        let second = registry.allocate_id("BB");

        assert_ne!(first, second);
        assert_eq!(registry.find("Aa"), Some(first));
        assert_eq!(registry.find("BB"), None);
    }

    #[test]
    fn test_syntax_mode_for_path() {
        assert_eq!(SyntaxMode::for_path("a/b/setup.py").mode, "ace/mode/python");
        assert_eq!(SyntaxMode::for_path("buildout.cfg").name, "ini");
        assert_eq!(SyntaxMode::for_path("instance.cfg.in").name, "django");
        assert_eq!(SyntaxMode::for_path("x/Makefile").name, "makefile");
        assert_eq!(SyntaxMode::for_path(".bashrc").name, "text");
        assert_eq!(SyntaxMode::for_path("README").name, "text");
    }

    #[test]
    fn test_tree_entry_listing_deserialization() {
        let json = r#"[
            {"title": "src", "key": "k1", "folder": true, "lazy": true, "path": "workspace/slapos/src"},
            {"title": "README.md", "key": "k2", "path": "workspace/slapos/README.md"}
        ]"#;
        let entries: Vec<TreeEntry> = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind(), NodeKind::Folder);
        assert!(entries[0].lazy);
        assert_eq!(entries[1].kind(), NodeKind::File);
        assert!(entries[1].children.is_empty());
    }

    #[test]
    fn test_file_browser_request_skips_empty_fields() {
        let request = FileBrowserRequest::new(FileBrowserOp::CopyAs, "workspace/slapos")
            .filename("a.py")
            .newfilename("b.py");
        let json = serde_json::to_value(&request).expect("Failed to serialize");
        assert_eq!(json["opt"], 14);
        assert_eq!(json["newfilename"], "b.py");
        assert!(json.get("files").is_none());
    }

    fn sample_tree() -> (FileTree, NodeId, NodeId, NodeId) {
        let mut tree = FileTree::new("workspace/slapos", "pfolder");
        let root = tree.root();
        let added = tree.add_children(
            root,
            vec![
                folder_entry("workspace/slapos", "src", "k1"),
                file_entry("workspace/slapos", "README.md", "k2"),
            ],
        );
        let src = added[0];
        let nested = tree.add_children(
            src,
            vec![
                folder_entry("workspace/slapos/src", "lib", "k3"),
                file_entry("workspace/slapos/src", "main.py", "k4"),
            ],
        );
        (tree, src, nested[0], nested[1])
    }

    #[test]
    fn test_file_tree_descendants() {
        let (tree, src, lib, main) = sample_tree();
        assert!(tree.is_descendant_of(lib, src));
        assert!(tree.is_descendant_of(main, tree.root()));
        assert!(!tree.is_descendant_of(src, src));
        assert!(!tree.is_descendant_of(src, lib));
        assert_eq!(tree.find_by_key("k4"), Some(main));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_file_tree_rename_repaths_subtree() {
        let (mut tree, src, _lib, main) = sample_tree();
        assert!(tree.rename(src, "source"));
        assert_eq!(tree.get(src).map(|n| n.path.as_str()), Some("workspace/slapos/source"));
        assert_eq!(
            tree.get(main).map(|n| n.path.as_str()),
            Some("workspace/slapos/source/main.py")
        );
    }

    #[test]
    fn test_file_tree_move_rejects_own_subtree() {
        let (mut tree, src, lib, _main) = sample_tree();
        assert!(!tree.move_to(src, lib));
        assert!(!tree.move_to(src, src));

        let readme = tree.find_by_path("workspace/slapos/README.md").expect("readme node");
        assert!(tree.move_to(readme, lib));
        assert_eq!(tree.parent(readme), Some(lib));
        assert_eq!(
            tree.get(readme).map(|n| n.path.as_str()),
            Some("workspace/slapos/src/lib/README.md")
        );
        assert_eq!(tree.child_titles(tree.root()), vec!["src".to_string()]);
    }

    #[test]
    fn test_file_tree_remove_drops_subtree() {
        let (mut tree, src, lib, main) = sample_tree();
        assert!(!tree.remove(tree.root()));
        assert!(tree.remove(src));
        assert!(tree.get(lib).is_none());
        assert!(tree.get(main).is_none());
        assert_eq!(tree.find_by_key("k4"), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_clipboard_state() {
        let clipboard = ClipboardState::default();
        assert!(clipboard.is_empty());

        let (tree, src, _, _) = sample_tree();
        let holding = ClipboardState::Holding { node: src, mode: PasteMode::Cut };
        assert_eq!(holding.mode(), Some(PasteMode::Cut));
        assert!(tree.get(src).is_some());
    }

    #[test]
    fn test_remote_response_deserialization() {
        let ok: RemoteResponse =
            serde_json::from_str(r#"{"code": 1, "result": "content"}"#).expect("Failed to deserialize");
        assert!(ok.is_success());
        let failed: RemoteResponse = serde_json::from_str(r#"{"code": 0}"#).expect("Failed to deserialize");
        assert!(!failed.is_success());
        assert_eq!(failed.result, "");
    }
}
