#[cfg(test)]
mod tests {
    use crate::handlers::errors::CommandError;
    use crate::models::{NoticeKind, TabId};
    use crate::services::*;
    use crate::tests::fakes::{editor_fixture, FakeRemote};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const A: &str = "workspace/slapos/a.py";
    const B: &str = "workspace/slapos/b.cfg";
    const C: &str = "workspace/slapos/c.txt";

    fn remote_with_files() -> FakeRemote {
        FakeRemote::new()
            .with_file(A, "print('a')")
            .with_file(B, "[buildout]")
            .with_file(C, "notes")
    }

    async fn opened(manager: &EditorSessionManager, path: &str) -> TabId {
        match manager.open(path).await {
            Ok(OpenOutcome::Opened(id)) => id,
            other => panic!("Expected {} to open, got {:?}", path, other),
        }
    }

    #[tokio::test]
    async fn test_open_edit_save_roundtrip() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let id = opened(manager, A).await;
        assert_eq!(id, TabId::of(A));
        let tab = manager.snapshot(id).expect("tab snapshot");
        assert_eq!(tab.title, "a.py");
        assert!(tab.active);
        assert!(!tab.busy);
        assert_eq!(manager.content(id).as_deref(), Some("print('a')"));

        manager.edit(id, "print('b')").expect("edit");
        let tab = manager.snapshot(id).expect("tab snapshot");
        assert_eq!(tab.title, "*a.py");
        assert!(tab.dirty);
        assert_eq!(manager.unsaved_count(), 1);
        assert_eq!(manager.navigation_warning(), Some(UNSAVED_WARNING));

        assert_eq!(manager.save(id).await, Ok(SaveOutcome::Saved));
        assert_eq!(fixture.remote.content(A).as_deref(), Some("print('b')"));
        let tab = manager.snapshot(id).expect("tab snapshot");
        assert_eq!(tab.title, "a.py");
        assert!(!tab.dirty);
        assert_eq!(manager.unsaved_count(), 0);
        assert_eq!(manager.navigation_warning(), None);
    }

    #[tokio::test]
    async fn test_open_existing_file_activates_tab() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        let b = opened(manager, B).await;
        assert_eq!(manager.active(), Some(b));

        assert_eq!(manager.open(A).await, Ok(OpenOutcome::Activated(a)));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.active(), Some(a));
        assert_eq!(fixture.remote.count("read_file"), 2);
        assert!(fixture.factory.resized.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_open_directory_or_while_busy_is_ignored() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        assert_eq!(manager.open("workspace/slapos/").await, Ok(OpenOutcome::Ignored));

        let guard = fixture.gate.try_begin().expect("gate free");
        assert_eq!(manager.open(A).await, Ok(OpenOutcome::Ignored));
        drop(guard);

        assert!(matches!(manager.open(A).await, Ok(OpenOutcome::Opened(_))));
        assert_eq!(fixture.remote.count("read_file"), 1);
    }

    #[tokio::test]
    async fn test_tab_ceiling() {
        let mut remote = FakeRemote::new();
        for i in 0..11 {
            remote = remote.with_file(&format!("workspace/f{}.txt", i), "x");
        }
        let fixture = editor_fixture(remote);
        let manager = &fixture.manager;

        for i in 0..10 {
            opened(manager, &format!("workspace/f{}.txt", i)).await;
        }
        let result = manager.open("workspace/f10.txt").await;
        assert_eq!(result, Err(CommandError::capacity(TOO_MANY_TABS)));
        assert_eq!(manager.len(), 10);

        let notice = fixture.notices.last().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, TOO_MANY_TABS);

        // Files already open still activate at the ceiling
        assert!(matches!(
            manager.open("workspace/f3.txt").await,
            Ok(OpenOutcome::Activated(_))
        ));
    }

    #[tokio::test]
    async fn test_open_failure_rolls_back_tab() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        let result = manager.open("workspace/slapos/missing.py").await;

        assert_eq!(
            result,
            Err(CommandError::network("Requested page not found. [404]"))
        );
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.active(), Some(a));
        assert_eq!(fixture.factory.destroyed.load(Ordering::SeqCst), 1);

        let notice = fixture.notices.last().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice
            .message
            .starts_with("Unable to open file: workspace/slapos/missing.py"));
    }

    #[tokio::test]
    async fn test_close_activates_neighbour() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        let b = opened(manager, B).await;
        let c = opened(manager, C).await;

        manager.close(c).expect("close c");
        assert_eq!(manager.active(), Some(b));

        manager.switch_active(a).expect("switch");
        manager.close(a).expect("close a");
        assert_eq!(manager.active(), Some(b));
        assert_eq!(manager.tab_paths(), vec![B.to_string()]);

        manager.close(b).expect("close b");
        assert!(manager.is_empty());
        assert_eq!(manager.active(), None);
        assert_eq!(fixture.factory.destroyed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_closing_inactive_tab_keeps_selection() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        let b = opened(manager, B).await;
        manager.close(a).expect("close a");
        assert_eq!(manager.active(), Some(b));
        assert_eq!(manager.close(a), Err(CommandError::not_found(format!("tab {}", a))));
    }

    #[tokio::test]
    async fn test_closing_dirty_tab_releases_guard() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        let b = opened(manager, B).await;
        manager.edit(a, "changed").expect("edit a");
        manager.edit(b, "changed").expect("edit b");
        assert_eq!(manager.unsaved_count(), 2);

        // A second change to a dirty tab does not count twice
        assert!(!manager.content_changed(a));
        assert_eq!(manager.unsaved_count(), 2);

        manager.close(a).expect("close a");
        assert_eq!(manager.unsaved_count(), 1);
        assert!(manager.navigation_warning().is_some());
    }

    #[tokio::test]
    async fn test_save_in_flight_blocks_second_save_and_close() {
        let fixture = editor_fixture(remote_with_files());
        let manager = fixture.manager.clone();

        let a = opened(&manager, A).await;
        manager.edit(a, "v2").expect("edit");
        let release = fixture.remote.hold_saves();

        let saving = manager.clone();
        let handle = tokio::spawn(async move { saving.save(a).await });
        while !manager.snapshot(a).map(|tab| tab.busy).unwrap_or(false) {
            tokio::task::yield_now().await;
        }

        assert_eq!(manager.save(a).await, Ok(SaveOutcome::Skipped));
        let closed = manager.close(a);
        assert_eq!(closed, Err(CommandError::busy("a.py is being saved, please wait")));
        assert_eq!(manager.len(), 1);

        release.notify_one();
        let result = handle.await.expect("save task");
        assert_eq!(result, Ok(SaveOutcome::Saved));
        assert_eq!(fixture.remote.count("write_file"), 1);
        assert!(!manager.snapshot(a).map(|tab| tab.busy).unwrap_or(true));
        manager.close(a).expect("close after save");
    }

    #[tokio::test]
    async fn test_save_failure_keeps_tab_dirty() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        assert_eq!(manager.save(a).await, Ok(SaveOutcome::Skipped));

        manager.edit(a, "v2").expect("edit");
        fixture.remote.fail(
            "write_file",
            RemoteError::Transport { status: Some(500), body: String::new() },
        );
        let result = manager.save(a).await;
        assert!(matches!(result, Err(CommandError::NetworkError { .. })));

        let tab = manager.snapshot(a).expect("tab snapshot");
        assert!(tab.dirty);
        assert!(!tab.busy);
        assert_eq!(manager.unsaved_count(), 1);
        assert_eq!(
            fixture.notices.last().map(|n| n.message),
            Some(
                "Internal Error. Cannot respond to your request, please check your parameters"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_tab_widths_follow_bar_width() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        opened(manager, A).await;
        opened(manager, B).await;
        manager.set_bar_width(613);
        let widths: Vec<u32> = manager.tabs().iter().map(|tab| tab.width).collect();
        // 613 / 2 = 306 rest 1, minus the extra width, capped at the title maximum
        assert_eq!(widths, vec![126, 126]);

        manager.set_bar_width(100);
        assert_eq!(manager.max_tabs(), 1);
        assert_eq!(manager.widths(), Some(TabWidths { each: 126, last: 126 }));
    }

    #[tokio::test]
    async fn test_tab_list_is_persisted_after_delay() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let a = opened(manager, A).await;
        opened(manager, B).await;
        manager.close(a).expect("close");
        assert_eq!(fixture.store.get(TAB_LIST_KEY), None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fixture.store.get(TAB_LIST_KEY), Some(B.to_string()));
        assert_eq!(manager.tab_list().write_count(), 1);
    }

    #[tokio::test]
    async fn test_restore_reopens_in_order() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;

        let paths = vec![A.to_string(), "workspace/gone.txt".to_string(), C.to_string()];
        let restored = manager.restore(&paths).await;
        assert_eq!(restored, vec![TabId::of(A), TabId::of(C)]);
        assert_eq!(manager.tab_paths(), vec![A.to_string(), C.to_string()]);
        assert_eq!(manager.active(), Some(TabId::of(C)));
    }

    #[tokio::test]
    async fn test_add_develop_below_buildout_header() {
        let remote = FakeRemote::new().with_file(
            B,
            "[buildout]\nextends = ../stack/buildout.cfg\n\n[eggs]\nrecipe = zc.recipe.egg\n",
        );
        let fixture = editor_fixture(remote);
        let manager = &fixture.manager;
        let id = opened(manager, B).await;

        let projects = vec!["/w/erp5".to_string(), "/w/slapos.core".to_string()];
        assert_eq!(manager.add_develop(&projects).await, Ok(true));

        assert_eq!(
            manager.content(id).as_deref(),
            Some(
                "[buildout]\ndevelop =\n\t/srv/slapgrid/w/erp5\n\t/srv/slapgrid/w/slapos.core\n\
                 extends = ../stack/buildout.cfg\n\n[eggs]\nrecipe = zc.recipe.egg\n"
            )
        );
        assert!(fixture
            .remote
            .calls()
            .contains(&"get_path /w/erp5#/w/slapos.core".to_string()));
        assert!(manager.snapshot(id).expect("tab").dirty);
        assert_eq!(manager.unsaved_count(), 1);
    }

    #[tokio::test]
    async fn test_add_develop_without_buildout_section() {
        let fixture = editor_fixture(remote_with_files());
        let manager = &fixture.manager;
        let id = opened(manager, A).await;

        let result = manager.add_develop(&["/w/erp5".to_string()]).await;
        assert_eq!(result, Err(CommandError::validation(BUILDOUT_NOT_FOUND)));
        let notice = fixture.notices.last().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Alert);
        assert_eq!(notice.message, BUILDOUT_NOT_FOUND);
        assert_eq!(fixture.remote.count("get_path"), 0);
        assert_eq!(manager.content(id).as_deref(), Some("print('a')"));
        assert!(!manager.snapshot(id).expect("tab").dirty);

        assert_eq!(manager.add_develop(&[]).await, Ok(false));
    }

    #[test]
    fn test_insert_develop_keeps_line_endings() {
        let paths = vec!["/srv/a".to_string()];
        assert_eq!(
            insert_develop("  [buildout]\r\nparts =\r\n", &paths).as_deref(),
            Some("  [buildout]\ndevelop =\n\t/srv/a\r\nparts =\r\n")
        );
        assert_eq!(
            insert_develop("[buildout]", &paths).as_deref(),
            Some("[buildout]\ndevelop =\n\t/srv/a")
        );
        assert_eq!(insert_develop("extends = buildout.cfg\n", &paths), None);
    }
}
