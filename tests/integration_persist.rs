use dock_layout::{DockArea, DockError, DockPosition, FloatRect, Panel};

fn build_area() -> DockArea {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut area = DockArea::new();
    for (key, title) in [
        ("editor", "Editor"),
        ("files", "Files"),
        ("log", "Log"),
        ("outline", "Outline"),
        ("scratch", "Scratch"),
    ] {
        area.add_panel(Panel::new(key, title));
    }
    area.dock("editor", DockPosition::Center, None).unwrap();
    area.dock("files", DockPosition::Left, Some("editor")).unwrap();
    area.dock("log", DockPosition::Bottom, Some("editor")).unwrap();
    area.dock("outline", DockPosition::Center, Some("files")).unwrap();

    area.float("scratch").unwrap();
    area.panel_mut("scratch")
        .unwrap()
        .set_floating_rect(Some(FloatRect::new(120.0, 80.0, 420.0, 260.0)));
    area
}

#[test]
fn store_then_load_reproduces_the_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let window = FloatRect::new(0.0, 0.0, 1600.0, 900.0);

    let area = build_area();
    area.store(&path, window).unwrap();

    let mut restored = DockArea::new();
    for key in ["editor", "files", "log", "outline", "scratch"] {
        restored.add_panel(Panel::new(key, "placeholder"));
    }
    let report = restored.load(&path).unwrap();

    assert!(report.missing.is_empty());
    assert_eq!(report.main_window, Some(window));
    assert_eq!(restored.root(), area.root());
    assert_eq!(restored.panel("editor").unwrap().title(), "Editor");
    assert!(restored.panel("files").unwrap().tabbed());
    let scratch = restored.panel("scratch").unwrap();
    assert!(scratch.floating());
    assert_eq!(
        scratch.floating_rect(),
        Some(FloatRect::new(120.0, 80.0, 420.0, 260.0)),
    );
}

#[test]
fn load_resolves_unknown_panels_via_callback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let area = build_area();
    area.store(&path, FloatRect::new(0.0, 0.0, 1024.0, 768.0)).unwrap();

    let mut restored = DockArea::new();
    let report = restored
        .load_with(&path, |key| Some(Panel::new(key, "created")))
        .unwrap();

    assert!(report.missing.is_empty());
    assert_eq!(restored.root(), area.root());
    // titles are always overwritten from the stored records
    assert_eq!(restored.panel("log").unwrap().title(), "Log");
}

#[test]
fn load_reports_unresolvable_panels_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    build_area()
        .store(&path, FloatRect::new(0.0, 0.0, 800.0, 600.0))
        .unwrap();

    let mut restored = DockArea::new();
    for key in ["editor", "files", "outline"] {
        restored.add_panel(Panel::new(key, "t"));
    }
    let report = restored.load(&path).unwrap();

    let mut missing = report.missing.clone();
    missing.sort();
    assert_eq!(missing, vec!["log".to_owned(), "scratch".to_owned()]);
    assert!(restored.is_docked("editor"));
    assert!(restored.is_docked("files"));
}

#[test]
fn load_closes_panels_absent_from_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let mut small = DockArea::new();
    small.add_panel(Panel::new("editor", "Editor"));
    small.dock("editor", DockPosition::Center, None).unwrap();
    small.store(&path, FloatRect::default()).unwrap();

    let mut area = build_area();
    area.load(&path).unwrap();

    assert_eq!(area.docked_keys(), vec!["editor".to_owned()]);
    for key in ["files", "log", "outline", "scratch"] {
        let panel = area.panel(key).unwrap();
        assert!(panel.closed(), "{key} should be closed");
        assert!(!panel.floating(), "{key} should not be floating");
        assert!(area.undocked_keys().contains(&key.to_owned()));
    }
}

#[test]
fn failed_reads_leave_the_layout_untouched() {
    let dir = tempfile::tempdir().unwrap();

    let mut area = build_area();
    let before = area.root().cloned();

    let absent = area.load(dir.path().join("nope.json"));
    assert!(matches!(absent, Err(DockError::Storage(_))));
    assert_eq!(area.root().cloned(), before);

    let garbled = dir.path().join("garbled.json");
    std::fs::write(&garbled, "{not json").unwrap();
    let parse = area.load(&garbled);
    assert!(matches!(parse, Err(DockError::Codec(_))));
    assert_eq!(area.root().cloned(), before);
}
