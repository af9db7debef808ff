use crate::error::{CliError, Result};
use crate::settings;
use crate::ui;
use crate::vcs::GitDiffProvider;
use changelog::{ChangeDetector, ChangelogConfig, CheckOutcome, ValidationReport, Validator};
use std::path::Path;

pub fn execute(config: &ChangelogConfig, verbose: bool) -> Result<()> {
    ui::section_header("Changelog Check");

    let provider = GitDiffProvider::new();
    let path = Path::new(&config.changelog_file);

    let context = settings::pipeline_context();
    let mut detector = ChangeDetector::new(config, context);
    if let Some(key) = provider.repo_relative(path) {
        detector = detector.with_changelog_file(&key);
    }
    if verbose {
        if detector.is_merge_context() {
            ui::info_message(&format!(
                "Merge request pipeline targeting '{}'",
                detector.resolve_target_branch()
            ));
        } else {
            ui::info_message("Not a merge request pipeline, update check will be skipped");
        }
    }

    let report = Validator::new(path, config, &detector, &provider).run();

    print_report(&report);

    if report.passed() {
        ui::success_message("All changelog checks passed");
        Ok(())
    } else {
        Err(CliError::ValidationFailed(report.failures().count()))
    }
}

fn print_report(report: &ValidationReport) {
    for check in &report.checks {
        match &check.outcome {
            CheckOutcome::Passed(detail) => {
                ui::success_message(&format!("{}: {detail}", check.kind));
            }
            CheckOutcome::Skipped(reason) => {
                ui::skipped_message(&format!("{}: skipped, {reason}", check.kind));
            }
            CheckOutcome::Failed { reason, hint } => {
                ui::error_message(&format!("{}: {reason}", check.kind));
                if let Some(hint) = hint {
                    ui::hint_message(hint);
                }
            }
        }
    }

    for warning in &report.warnings {
        ui::warning_message(&warning.to_string());
    }
}
