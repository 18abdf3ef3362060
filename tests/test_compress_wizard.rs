//! Unit tests for the compression wizard state machine
//!
//! Covers both target methods, the unit shortcut keys, output-path
//! redirection, and the honest-reporting policy for results.

use std::fs;

use crossterm::event::KeyCode;
use tempfile::TempDir;

use imgforge::jobs::{JobOutcome, JobRequest};
use imgforge::settings::Settings;
use imgforge::tui::compress_wizard::{CompressMethod, CompressStep, CompressWizard};
use imgforge::tui::WizardEvent;

const INPUT_SIZE: usize = 1_000_000;

/// A directory with doc.pdf and photo.png; photo.png is exactly 1,000,000
/// bytes so percentage targets are easy to reason about.
fn fixture() -> (TempDir, CompressWizard) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("doc.pdf"), b"%PDF-1.4").unwrap();
    fs::write(dir.path().join("photo.png"), vec![0u8; INPUT_SIZE]).unwrap();
    let wizard = CompressWizard::new(dir.path().to_path_buf(), &Settings::default());
    (dir, wizard)
}

fn press(wizard: &mut CompressWizard, code: KeyCode) {
    wizard.update(&WizardEvent::key(code));
}

fn type_text(wizard: &mut CompressWizard, text: &str) {
    for c in text.chars() {
        press(wizard, KeyCode::Char(c));
    }
}

/// Entries sort case-insensitively: doc.pdf first, photo.png second.
fn select_photo(wizard: &mut CompressWizard) {
    press(wizard, KeyCode::Down);
    press(wizard, KeyCode::Enter);
    assert_eq!(wizard.step(), CompressStep::SelectMethod);
}

fn select_pdf(wizard: &mut CompressWizard) {
    press(wizard, KeyCode::Enter);
    assert_eq!(wizard.step(), CompressStep::SelectMethod);
}

#[test]
fn cancelling_selection_returns_to_menu() {
    let (_dir, mut wizard) = fixture();
    press(&mut wizard, KeyCode::Esc);
    assert!(wizard.is_finished());
    assert!(wizard.wants_menu());
}

#[test]
fn image_output_is_redirected_to_jpg() {
    let (dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    assert_eq!(
        wizard.output_file(),
        Some(&dir.path().join("photo_comp.jpg"))
    );
}

#[test]
fn pdf_output_keeps_its_extension() {
    let (dir, mut wizard) = fixture();
    select_pdf(&mut wizard);
    assert_eq!(wizard.output_file(), Some(&dir.path().join("doc_comp.pdf")));
}

#[test]
fn percent_method_computes_floor_target() {
    let (dir, mut wizard) = fixture();
    select_photo(&mut wizard);

    press(&mut wizard, KeyCode::Enter); // method: percentage
    assert_eq!(wizard.step(), CompressStep::SetPercent);
    assert_eq!(wizard.method(), CompressMethod::Percent);

    type_text(&mut wizard, "50");
    press(&mut wizard, KeyCode::Enter);
    assert_eq!(wizard.step(), CompressStep::Confirm);
    assert_eq!(wizard.target_bytes(), 500_000);

    press(&mut wizard, KeyCode::Char('y'));
    assert_eq!(
        wizard.take_job(),
        Some(JobRequest::Compress {
            input: dir.path().join("photo.png"),
            input_size: 1_000_000,
            target_bytes: 500_000,
            output: dir.path().join("photo_comp.jpg"),
        })
    );
}

#[test]
fn percent_extremes() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "1");
    press(&mut wizard, KeyCode::Enter);
    assert_eq!(wizard.target_bytes(), 10_000);

    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "100");
    press(&mut wizard, KeyCode::Enter);
    assert_eq!(wizard.target_bytes(), 1_000_000);
}

#[test]
fn empty_percent_uses_configured_default() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter); // empty input
    assert_eq!(wizard.step(), CompressStep::Confirm);
    // Default compress percent is 75.
    assert_eq!(wizard.target_bytes(), 750_000);
}

#[test]
fn fixed_size_with_explicit_unit_step() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);

    press(&mut wizard, KeyCode::Down); // method: fixed size
    press(&mut wizard, KeyCode::Enter);
    assert_eq!(wizard.step(), CompressStep::SetSizeValue);
    assert_eq!(wizard.method(), CompressMethod::FixedSize);

    type_text(&mut wizard, "2");
    press(&mut wizard, KeyCode::Enter);
    assert_eq!(wizard.step(), CompressStep::SetSizeUnit);

    type_text(&mut wizard, "kb");
    press(&mut wizard, KeyCode::Enter);
    assert_eq!(wizard.step(), CompressStep::Confirm);
    assert_eq!(wizard.target_bytes(), 2_048, "KB is case-insensitive");
}

#[test]
fn fixed_size_unit_defaults_to_kb() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Down);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "3");
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter); // empty unit
    assert_eq!(wizard.target_bytes(), 3_072);
}

#[test]
fn unit_shortcut_keys_skip_the_unit_step() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Down);
    press(&mut wizard, KeyCode::Enter);

    type_text(&mut wizard, "100");
    press(&mut wizard, KeyCode::Char('m'));
    assert_eq!(wizard.step(), CompressStep::Confirm);
    assert_eq!(wizard.target_bytes(), 104_857_600);

    // Bytes shortcut.
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Down);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "512");
    press(&mut wizard, KeyCode::Char('B'));
    assert_eq!(wizard.step(), CompressStep::Confirm);
    assert_eq!(wizard.target_bytes(), 512);
}

#[test]
fn unit_shortcut_requires_a_parsed_value() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Down);
    press(&mut wizard, KeyCode::Enter);

    press(&mut wizard, KeyCode::Char('k'));
    assert_eq!(
        wizard.step(),
        CompressStep::SetSizeValue,
        "shortcut with an empty field is ignored"
    );
}

#[test]
fn reduction_is_reported_when_target_met() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "50");
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter); // confirm
    wizard.take_job();

    wizard.update(&WizardEvent::Job(JobOutcome {
        success: true,
        message: "Compression complete".to_string(),
        outputs: vec![],
        output_size: Some(400_000),
    }));
    assert_eq!(wizard.step(), CompressStep::Done);
    assert_eq!(
        wizard.result_line(),
        "Compressed successfully! Reduced by 60.0%"
    );
}

#[test]
fn target_miss_is_reported_honestly_not_as_error() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "50");
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter);
    wizard.take_job();

    wizard.update(&WizardEvent::Job(JobOutcome {
        success: true,
        message: "Compression complete".to_string(),
        outputs: vec![],
        output_size: Some(600_000),
    }));
    assert_eq!(wizard.step(), CompressStep::Done);
    assert!(wizard.result_line().contains("couldn't reach target"));
    assert!(
        wizard.result_line().contains("585.9 KB"),
        "best achieved size is stated"
    );
}

#[test]
fn failure_diagnostic_is_shown_verbatim() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter);
    wizard.take_job();

    wizard.update(&WizardEvent::Job(JobOutcome::failure(
        "Compression failed: cannot open file",
    )));
    assert_eq!(wizard.result_line(), "Compression failed: cannot open file");
}

#[test]
fn working_step_ignores_keyboard_input() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter);
    wizard.take_job();
    assert_eq!(wizard.step(), CompressStep::Working);

    for code in [KeyCode::Enter, KeyCode::Esc, KeyCode::Char('q')] {
        press(&mut wizard, code);
        assert_eq!(wizard.step(), CompressStep::Working);
    }
}

#[test]
fn confirm_back_reenters_the_method_specific_step() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Down);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "5");
    press(&mut wizard, KeyCode::Char('k'));
    assert_eq!(wizard.step(), CompressStep::Confirm);

    press(&mut wizard, KeyCode::Esc);
    assert_eq!(wizard.step(), CompressStep::SetSizeValue);
}

#[test]
fn restart_resets_file_and_target_state() {
    let (_dir, mut wizard) = fixture();
    select_photo(&mut wizard);
    press(&mut wizard, KeyCode::Enter);
    type_text(&mut wizard, "50");
    press(&mut wizard, KeyCode::Enter);
    press(&mut wizard, KeyCode::Enter);
    wizard.take_job();
    wizard.update(&WizardEvent::Job(JobOutcome {
        success: true,
        message: String::new(),
        outputs: vec![],
        output_size: Some(100),
    }));

    press(&mut wizard, KeyCode::Char('a'));
    assert_eq!(wizard.step(), CompressStep::SelectFile);
    assert_eq!(wizard.target_bytes(), 0);
    assert!(wizard.output_file().is_none());
    assert_eq!(wizard.result_line(), "");
}
