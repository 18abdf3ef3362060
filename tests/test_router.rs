//! Unit tests for the top-level router
//!
//! Verifies the readiness gate, menu navigation, wizard entry/exit and the
//! scoping of the global quit key.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crossterm::event::KeyCode;
use tempfile::TempDir;

use imgforge::deps::{ToolCheck, ToolReport, ToolStatus};
use imgforge::files::FolderOpener;
use imgforge::jobs::JobOutcome;
use imgforge::settings::Settings;
use imgforge::tui::app::{App, Screen};
use imgforge::tui::WizardEvent;

struct NoopOpener;

impl FolderOpener for NoopOpener {
    fn reveal(&self, _path: &Path) {}
}

fn tool(name: &'static str, ok: bool) -> ToolCheck {
    ToolCheck {
        name,
        command: ok.then(|| name.to_lowercase()),
        status: if ok {
            ToolStatus::Ok
        } else {
            ToolStatus::NotFound
        },
        version: ok.then(|| "7.1.0".to_string()),
        detail: if ok {
            format!("{} detected", name)
        } else {
            format!("{} not found in PATH", name)
        },
        purpose: "",
        download_url: "",
    }
}

fn report(magick_ok: bool, gs_ok: bool) -> ToolReport {
    ToolReport {
        magick: tool("ImageMagick", magick_ok),
        ghostscript: tool("Ghostscript", gs_ok),
    }
}

fn fixture_app() -> (TempDir, App) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report.pdf"), b"%PDF-1.4").unwrap();
    let app = App::new(
        Settings::default(),
        dir.path().to_path_buf(),
        Arc::new(NoopOpener),
    );
    (dir, app)
}

fn press(app: &mut App, code: KeyCode) {
    app.handle(WizardEvent::key(code));
}

#[test]
fn starts_blocked_until_readiness_arrives() {
    let (_dir, mut app) = fixture_app();
    assert_eq!(app.screen(), Screen::Readiness);

    // Input before the report arrives changes nothing except quit.
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.screen(), Screen::Readiness);
    assert!(!app.should_quit());
}

#[test]
fn missing_tools_block_everything_but_quit() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(false, false)));
    assert_eq!(app.screen(), Screen::Readiness);

    // No wizard can be entered.
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen(), Screen::Readiness);
    assert!(!app.should_quit());

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}

#[test]
fn partial_availability_still_blocks() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, false)));
    assert_eq!(app.screen(), Screen::Readiness);
}

#[test]
fn ready_report_unlocks_the_menu() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, true)));
    assert_eq!(app.screen(), Screen::Menu);
}

#[test]
fn menu_enters_each_wizard_and_exit_quits() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, true)));

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen(), Screen::PdfWizard);
    // Cancel file selection bubbles back out to the menu.
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.screen(), Screen::Menu);

    // The cursor position survives the round trip, so one step down each
    // time walks the remaining items.
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen(), Screen::FormatWizard);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.screen(), Screen::Menu);

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen(), Screen::CompressWizard);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.screen(), Screen::Menu);

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert!(app.should_quit(), "the last menu item exits");
}

#[test]
fn menu_cursor_wraps() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, true)));

    // Up from the first item wraps to Exit (last item).
    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Enter);
    assert!(app.should_quit());
}

#[test]
fn global_quit_works_in_menu_only() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, true)));

    // Enter the PDF wizard; q mid-flow must not quit the app.
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen(), Screen::PdfWizard);
    press(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit());
    assert_eq!(app.screen(), Screen::PdfWizard);

    // Back in the menu it does.
    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}

#[test]
fn job_flow_routes_through_the_active_wizard() {
    let (dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, true)));

    // Walk the PDF wizard to dispatch on defaults.
    press(&mut app, KeyCode::Enter); // menu -> pdf wizard
    assert!(app.take_job().is_none());
    for _ in 0..6 {
        press(&mut app, KeyCode::Enter);
    }

    let job = app.take_job().expect("confirmed wizard leaves a job behind");
    match job {
        imgforge::jobs::JobRequest::PdfConvert { input, .. } => {
            assert_eq!(input, dir.path().join("report.pdf"));
        }
        other => panic!("unexpected job: {:?}", other),
    }

    // Completion re-enters through the router and lands in the wizard.
    app.handle(WizardEvent::Job(JobOutcome {
        success: true,
        message: String::new(),
        outputs: vec![dir.path().join("report_images").join("Page-0.png")],
        output_size: None,
    }));
    assert_eq!(app.screen(), Screen::PdfWizard);

    // Done -> menu.
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen(), Screen::Menu);
}

#[test]
fn quit_from_wizard_done_step_is_honored() {
    let (_dir, mut app) = fixture_app();
    app.handle(WizardEvent::Readiness(report(true, true)));

    press(&mut app, KeyCode::Enter);
    for _ in 0..6 {
        press(&mut app, KeyCode::Enter);
    }
    app.take_job();
    app.handle(WizardEvent::Job(JobOutcome::failure("boom")));

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
    assert_eq!(
        app.screen(),
        Screen::PdfWizard,
        "quit does not detour through the menu"
    );
}
