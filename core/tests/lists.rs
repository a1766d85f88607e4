use penwise_core::{
    Config, EditorSession, ListConfig, ListEngine, NewlineOutcome, SyncState, TextRange,
};

fn press_enter(text: &str, caret: usize) -> Option<String> {
    ListEngine::default()
        .continue_list(text, TextRange::caret(caret))
        .map(|batch| batch.apply(text))
}

#[test]
fn unordered_continues_with_same_bullet() {
    assert_eq!(press_enter("- buy milk", 10).as_deref(), Some("- buy milk\n- "));
    assert_eq!(press_enter("* one", 5).as_deref(), Some("* one\n* "));
    assert_eq!(press_enter("  + two", 7).as_deref(), Some("  + two\n  + "));
}

#[test]
fn empty_unordered_item_ends_list() {
    assert_eq!(press_enter("- ", 2).as_deref(), Some("\n"));
    assert_eq!(press_enter("- a\n- \nafter", 6).as_deref(), Some("- a\n\nafter"));
}

#[test]
fn ordered_continuation_increments_and_keeps_separator() {
    assert_eq!(press_enter("1. first", 8).as_deref(), Some("1. first\n2. "));
    assert_eq!(press_enter("7) step", 7).as_deref(), Some("7) step\n8) "));
}

#[test]
fn ordered_insert_renumbers_siblings() {
    let text = "1. a\n2. b\n3. c";
    assert_eq!(
        press_enter(text, 4).as_deref(),
        Some("1. a\n2. \n3. b\n4. c")
    );
}

#[test]
fn checklist_continues_unchecked() {
    assert_eq!(
        press_enter("- [x] done", 10).as_deref(),
        Some("- [x] done\n- [ ] ")
    );
    assert_eq!(press_enter("- [ ] ", 6).as_deref(), Some("\n"));
}

#[test]
fn non_list_lines_fall_through() {
    assert!(press_enter("just text", 9).is_none());
    assert!(press_enter("----", 4).is_none());
    assert!(press_enter("", 0).is_none());
}

#[test]
fn selection_replaced_by_newline() {
    let text = "- buy milk and eggs";
    let batch = ListEngine::default()
        .continue_list(text, TextRange::new(10, 9))
        .unwrap();
    assert_eq!(batch.apply(text), "- buy milk\n- ");
    assert_eq!(batch.selection, TextRange::caret(13));
}

#[test]
fn indent_selection_covers_touched_lines_only() {
    let engine = ListEngine::new(ListConfig {
        indent_width: 2,
        use_tabs: false,
    });
    let text = "- a\n- b\n- c";
    // Selection ends at the start of the third line; that line is untouched.
    let batch = engine.indent_lines(text, TextRange::new(0, 8), false);
    assert_eq!(batch.apply(text), "  - a\n  - b\n- c");
    assert_eq!(batch.selection, TextRange::new(0, 12));
}

#[test]
fn indent_caret_moves_with_text() {
    let engine = ListEngine::default();
    let text = "- a";
    let batch = engine.indent_lines(text, TextRange::caret(2), false);
    assert_eq!(batch.selection, TextRange::caret(6));
    let out = engine.indent_lines(&batch.apply(text), batch.selection, true);
    assert_eq!(out.apply("    - a"), "- a");
    assert_eq!(out.selection, TextRange::caret(2));
}

#[test]
fn outdent_never_moves_endpoint_before_edit() {
    let engine = ListEngine::default();
    let text = "    - a";
    let batch = engine.indent_lines(text, TextRange::caret(2), true);
    assert_eq!(batch.apply(text), "- a");
    assert_eq!(batch.selection, TextRange::caret(0));
}

#[test]
fn session_round_trip_for_list_edit() {
    let mut session = EditorSession::new(&Config::default()).unwrap();
    let text = "1. one";
    let outcome = session.newline(text, TextRange::caret(6)).unwrap();
    let NewlineOutcome::Edit(batch) = outcome else {
        panic!("expected continuation, got {outcome:?}");
    };
    let updated = batch.apply(text);
    assert_eq!(updated, "1. one\n2. ");
    assert!(session
        .text_did_change(&updated, batch.selection)
        .unwrap()
        .is_none());
    let h = session.finish_self_edit(&updated, batch.selection).unwrap();
    assert_eq!(session.state(), SyncState::Idle);
    assert_eq!(h.active_range.slice(&updated), "2. ");
}
