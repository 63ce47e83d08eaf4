use super::state::FileOperationResult;
use super::*;
use crate::cards::{CardKind, CardSpec};
use crate::codec;
use crate::program::Program;
use eframe::egui;

/// Screen rect used by all headless frames.
fn test_screen() -> egui::Rect {
    egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1200.0, 800.0))
}

/// Runs one headless egui frame with the given input events, drawing
/// the canvas into a central panel.
fn run_canvas_frame(ctx: &egui::Context, app: &mut RobocardsApp, events: Vec<egui::Event>) {
    let raw = egui::RawInput {
        screen_rect: Some(test_screen()),
        events,
        ..Default::default()
    };
    let _ = ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });
}

/// A pointer position inside the first pair row.
///
/// Rows are centered horizontally on a 1200 point wide screen, and the
/// first row starts just below the top of the central panel, so the
/// point (600, 60) lands inside the first row at any legal scale.
fn first_row_pos() -> egui::Pos2 {
    egui::pos2(600.0, 60.0)
}

#[test]
fn palette_click_builds_up_one_row() {
    let mut app = RobocardsApp::default();

    app.append_card(CardSpec::new(CardKind::Tap));
    // One filled row plus the trailing blank row
    assert_eq!(app.program.pairs().len(), 2);
    let id = app.interaction.selected_pair.expect("new row selected");

    // The action lands on the same, still selected row
    app.append_card(CardSpec::new(CardKind::Move));
    assert_eq!(app.program.pairs().len(), 2);
    let pair = app.program.pair(id).expect("row exists");
    assert_eq!(pair.event.as_ref().map(|c| c.kind()), Some(CardKind::Tap));
    assert_eq!(pair.action.as_ref().map(|c| c.kind()), Some(CardKind::Move));

    // A second action goes to the trailing blank row instead
    app.append_card(CardSpec::new(CardKind::ColorTop));
    assert_eq!(app.program.pairs().len(), 3);
    assert_ne!(app.interaction.selected_pair, Some(id));
    assert!(app.program.pairs().last().is_some_and(|p| p.is_blank()));
}

#[test]
fn clicking_a_row_selects_it() {
    let mut app = RobocardsApp::default();
    let id = app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.program.ensure_trailing_blank_pair();

    let pos = first_row_pos();
    let ctx = egui::Context::default();

    // Hover, press, release: egui registers the click on release
    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(pos)]);
    run_canvas_frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        }],
    );
    run_canvas_frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        }],
    );

    assert_eq!(app.interaction.selected_pair, Some(id));
}

#[test]
fn dropping_a_palette_card_fills_the_row_slot() {
    let mut app = RobocardsApp::default();
    let id = app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.program.ensure_trailing_blank_pair();

    // A drag from the action palette is in flight
    app.interaction.dragging_kind = Some(CardKind::Move);

    let pos = first_row_pos();
    let ctx = egui::Context::default();
    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(pos)]);
    run_canvas_frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        }],
    );
    run_canvas_frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        }],
    );

    let pair = app.program.pair(id).expect("row exists");
    assert_eq!(pair.action.as_ref().map(|c| c.kind()), Some(CardKind::Move));
    assert_eq!(app.interaction.selected_pair, Some(id));
    assert!(app.interaction.dragging_kind.is_none());
    assert!(app.program.pairs().last().is_some_and(|p| p.is_blank()));
}

#[test]
fn releasing_a_drag_outside_any_row_cancels_it() {
    let mut app = RobocardsApp::default();
    app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.program.ensure_trailing_blank_pair();
    app.interaction.dragging_kind = Some(CardKind::Move);

    // Release far outside the row column
    let pos = egui::pos2(20.0, 700.0);
    let ctx = egui::Context::default();
    run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(pos)]);
    run_canvas_frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        }],
    );

    assert!(app.interaction.dragging_kind.is_none());
    let pair = &app.program.pairs()[0];
    assert!(pair.action.is_none(), "a missed drop must not place a card");
}

#[test]
fn delete_key_removes_the_selected_row() {
    let mut app = RobocardsApp::default();
    let id = app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.program.add_event_card(CardSpec::new(CardKind::Clap));
    app.program.ensure_trailing_blank_pair();
    app.interaction.selected_pair = Some(id);

    let ctx = egui::Context::default();
    let raw = egui::RawInput {
        screen_rect: Some(test_screen()),
        events: vec![egui::Event::Key {
            key: egui::Key::Delete,
            physical_key: Some(egui::Key::Delete),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }],
        ..Default::default()
    };
    let _ = ctx.run(raw, |ctx| {
        app.handle_delete_key(ctx);
    });

    assert!(app.program.pair(id).is_none());
    assert!(app.interaction.selected_pair.is_none());
    assert!(app.program.pairs().last().is_some_and(|p| p.is_blank()));
}

#[test]
fn new_shortcut_raises_unsaved_dialog_on_modified_program() {
    let mut app = RobocardsApp::default();
    app.program.add_event_card(CardSpec::new(CardKind::Tap));
    assert!(app.program.is_modified());

    let ctx = egui::Context::default();
    let raw = egui::RawInput {
        screen_rect: Some(test_screen()),
        events: vec![egui::Event::Key {
            key: egui::Key::N,
            physical_key: Some(egui::Key::N),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers {
                command: true,
                ..Default::default()
            },
        }],
        ..Default::default()
    };
    let _ = ctx.run(raw, |ctx| {
        app.handle_file_shortcuts(ctx);
    });

    assert!(app.dialogs.show_unsaved_dialog);
    assert_eq!(
        app.dialogs.pending_confirm_action,
        Some(PendingConfirmAction::New)
    );
    // The program itself is untouched until the user confirms
    assert!(!app.program.is_empty());
}

#[test]
fn new_shortcut_resets_clean_program_directly() {
    let mut app = RobocardsApp::default();
    app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.program.set_modified(false);
    app.file.current_path = Some("demo.rcp".to_string());

    let ctx = egui::Context::default();
    let raw = egui::RawInput {
        screen_rect: Some(test_screen()),
        events: vec![egui::Event::Key {
            key: egui::Key::N,
            physical_key: Some(egui::Key::N),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers {
                command: true,
                ..Default::default()
            },
        }],
        ..Default::default()
    };
    let _ = ctx.run(raw, |ctx| {
        app.handle_file_shortcuts(ctx);
    });

    assert!(!app.dialogs.show_unsaved_dialog);
    assert!(app.program.is_empty());
    assert!(app.file.current_path.is_none());
}

/// Runs one frame that only processes pending file operations.
fn run_file_ops_frame(app: &mut RobocardsApp) {
    let ctx = egui::Context::default();
    let raw = egui::RawInput {
        screen_rect: Some(test_screen()),
        ..Default::default()
    };
    let _ = ctx.run(raw, |ctx| {
        app.handle_pending_operations(ctx);
    });
}

#[test]
fn save_completion_records_the_path() {
    let mut app = RobocardsApp::default();
    let sender = app.file.file_operation_sender.clone().expect("sender");
    sender
        .send(FileOperationResult::SaveCompleted("demo.rcp".to_string()))
        .expect("channel open");

    run_file_ops_frame(&mut app);

    assert_eq!(app.file.current_path.as_deref(), Some("demo.rcp"));
}

#[test]
fn save_completion_runs_the_deferred_action() {
    let mut app = RobocardsApp::default();
    app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.dialogs.after_save_action = Some(PendingConfirmAction::New);

    let sender = app.file.file_operation_sender.clone().expect("sender");
    sender
        .send(FileOperationResult::SaveCompleted("demo.rcp".to_string()))
        .expect("channel open");

    run_file_ops_frame(&mut app);

    assert!(app.dialogs.after_save_action.is_none());
    assert!(app.program.is_empty(), "deferred New should have run");
}

#[test]
fn cancelled_save_drops_the_deferred_action() {
    let mut app = RobocardsApp::default();
    app.program.add_event_card(CardSpec::new(CardKind::Tap));
    app.dialogs.after_save_action = Some(PendingConfirmAction::Quit);

    let sender = app.file.file_operation_sender.clone().expect("sender");
    sender
        .send(FileOperationResult::SaveCancelled)
        .expect("channel open");

    run_file_ops_frame(&mut app);

    assert!(app.dialogs.after_save_action.is_none());
    assert!(!app.program.is_empty(), "cancel must not touch the program");
}

#[test]
fn loading_a_project_applies_the_stored_program() {
    // Build a saved project on the side
    let mut donor = Program::new();
    let id = donor.add_event_card(CardSpec::new(CardKind::Button));
    donor.place_card(id, CardSpec::new(CardKind::Move));
    let fragment = codec::encode(&mut donor).expect("non-empty program encodes");
    let content = codec::embed_in_project(None, &fragment).expect("embedding succeeds");

    let mut app = RobocardsApp::default();
    let sender = app.file.file_operation_sender.clone().expect("sender");
    sender
        .send(FileOperationResult::LoadCompleted(
            "demo.rcp".to_string(),
            content,
        ))
        .expect("channel open");

    run_file_ops_frame(&mut app);

    assert_eq!(app.file.current_path.as_deref(), Some("demo.rcp"));
    assert!(app.dialogs.load_error.is_none());
    assert!(!app.program.is_modified(), "a fresh load starts clean");

    let first = &app.program.pairs()[0];
    assert_eq!(
        first.event.as_ref().map(|c| c.kind()),
        Some(CardKind::Button)
    );
    assert_eq!(first.action.as_ref().map(|c| c.kind()), Some(CardKind::Move));
    assert!(app.program.pairs().last().is_some_and(|p| p.is_blank()));
}

#[test]
fn loading_an_unknown_card_raises_the_error_dialog() {
    let content = r#"<project><robocards><buttonset event-name="warp"/></robocards></project>"#;

    let mut app = RobocardsApp::default();
    let sender = app.file.file_operation_sender.clone().expect("sender");
    sender
        .send(FileOperationResult::LoadCompleted(
            "broken.rcp".to_string(),
            content.to_string(),
        ))
        .expect("channel open");

    run_file_ops_frame(&mut app);

    let error = app.dialogs.load_error.as_deref().expect("error is surfaced");
    assert!(error.contains("warp"), "error names the offending card");
    // The path is not adopted for a file we could not load
    assert!(app.file.current_path.is_none());
}

#[test]
fn app_state_round_trips_through_json() {
    let mut app = RobocardsApp::default();
    app.dark_mode = false;
    app.program.add_event_card(CardSpec::new(CardKind::Prox));
    app.program.set_color_scheme(3);
    app.window_inner_size = Some((1024.0, 640.0));

    let json = app.to_json().expect("state serializes");
    let restored = RobocardsApp::from_json(&json).expect("state deserializes");

    assert!(!restored.dark_mode);
    assert_eq!(restored.program.pairs().len(), 1);
    assert_eq!(restored.program.color_scheme(), 3);
    assert_eq!(restored.window_inner_size, Some((1024.0, 640.0)));
    // Transient interaction state is not persisted
    assert!(restored.interaction.selected_pair.is_none());
}
