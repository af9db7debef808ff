use crate::config::ChangelogConfig;
use crate::detector::{ChangeDetector, DiffOutcome, DiffProvider};
use crate::document::ChangelogDocument;
use crate::format::FormatWarning;
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use tracing::{debug, info};

/// Progress of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    NotRun,
    Existence,
    UpdateCheck,
    FormatCheck,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Existence,
    UpdateRequired,
    Format,
}

impl Display for CheckKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Existence => "Changelog exists",
            Self::UpdateRequired => "Changelog updated for source changes",
            Self::Format => "Changelog format",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed(String),
    Failed {
        reason: String,
        hint: Option<String>,
    },
    /// The check could not run; it does not block the pipeline
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub outcome: CheckOutcome,
}

impl CheckResult {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
    pub warnings: Vec<FormatWarning>,
    stage: ValidationStage,
    history: Vec<ValidationStage>,
}

impl ValidationReport {
    #[must_use]
    pub const fn stage(&self) -> ValidationStage {
        self.stage
    }

    /// Every stage the run went through, the final one included
    #[must_use]
    pub fn history(&self) -> &[ValidationStage] {
        &self.history
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.stage == ValidationStage::Done
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| check.is_failure())
    }

    #[must_use]
    pub fn check(&self, kind: CheckKind) -> Option<&CheckOutcome> {
        self.checks
            .iter()
            .find(|check| check.kind == kind)
            .map(|check| &check.outcome)
    }
}

/// Runs the changelog checks for one working tree.
///
/// The existence check gates everything else. The update check only runs in
/// a merge context, and the format check always runs once the file exists.
pub struct Validator<'a> {
    path: &'a Path,
    config: &'a ChangelogConfig,
    detector: &'a ChangeDetector,
    provider: &'a dyn DiffProvider,
}

impl<'a> Validator<'a> {
    pub fn new(
        path: &'a Path,
        config: &'a ChangelogConfig,
        detector: &'a ChangeDetector,
        provider: &'a dyn DiffProvider,
    ) -> Self {
        Self {
            path,
            config,
            detector,
            provider,
        }
    }

    #[must_use]
    pub fn run(&self) -> ValidationReport {
        let mut report = ValidationReport {
            checks: Vec::with_capacity(3),
            warnings: Vec::new(),
            stage: ValidationStage::NotRun,
            history: Vec::with_capacity(5),
        };
        let mut document = None;

        loop {
            debug!(stage = ?report.stage, "validation stage");
            report.history.push(report.stage);
            report.stage = match report.stage {
                ValidationStage::NotRun => ValidationStage::Existence,
                ValidationStage::Existence => {
                    match ChangelogDocument::load(self.path) {
                        Ok(loaded) => {
                            document = Some(loaded);
                            report.record(
                                CheckKind::Existence,
                                CheckOutcome::Passed(format!("{} found", self.path.display())),
                            );
                            ValidationStage::UpdateCheck
                        }
                        Err(e) => {
                            report.record(
                                CheckKind::Existence,
                                CheckOutcome::Failed {
                                    reason: e.user_message(),
                                    hint: e.hint(),
                                },
                            );
                            ValidationStage::Failed
                        }
                    }
                }
                ValidationStage::UpdateCheck => {
                    let outcome = self.update_check();
                    report.record(CheckKind::UpdateRequired, outcome);
                    ValidationStage::FormatCheck
                }
                ValidationStage::FormatCheck => {
                    if let Some(document) = &document {
                        let format = document.validate_format(&self.config.reference_url);
                        report.warnings.clone_from(&format.warnings);
                        let outcome = match format.into_result() {
                            Ok(_) => CheckOutcome::Passed("Unreleased section present".to_string()),
                            Err(e) => CheckOutcome::Failed {
                                reason: e.user_message(),
                                hint: e.hint(),
                            },
                        };
                        report.record(CheckKind::Format, outcome);
                    }

                    if report.failures().next().is_some() {
                        ValidationStage::Failed
                    } else {
                        ValidationStage::Done
                    }
                }
                ValidationStage::Done | ValidationStage::Failed => break,
            };
        }

        info!(
            stage = ?report.stage,
            failures = report.failures().count(),
            "validation finished"
        );
        report
    }

    fn update_check(&self) -> CheckOutcome {
        if !self.detector.is_merge_context() {
            return CheckOutcome::Skipped("not a merge request pipeline".to_string());
        }

        let target = self.detector.resolve_target_branch();
        let changed = match self.detector.diff(self.provider) {
            DiffOutcome::Changed(changed) => changed,
            DiffOutcome::Unavailable(reason) => {
                return CheckOutcome::Skipped(format!(
                    "could not diff against '{target}' ({reason})"
                ));
            }
        };

        let changelog = self.detector.changelog_file();
        if !self.detector.requires_changelog_update(&changed) {
            CheckOutcome::Passed(format!("no source changes against '{target}'"))
        } else if self.detector.is_satisfied(&changed) {
            CheckOutcome::Passed(format!("{changelog} updated"))
        } else {
            CheckOutcome::Failed {
                reason: format!("source changed but {changelog} not updated"),
                hint: Some(format!(
                    "Add an entry under '## [Unreleased]' with `chlog add` and commit {changelog}"
                )),
            }
        }
    }
}

impl ValidationReport {
    fn record(&mut self, kind: CheckKind, outcome: CheckOutcome) {
        self.checks.push(CheckResult { kind, outcome });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::PipelineContext;
    use crate::error::ChangelogError;
    use crate::types::Result;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct FixedDiff(Option<Vec<&'static str>>);

    impl DiffProvider for FixedDiff {
        fn changed_paths(&self, _target_branch: &str) -> Result<Vec<String>> {
            self.0
                .as_ref()
                .map(|paths| paths.iter().map(ToString::to_string).collect())
                .ok_or_else(|| ChangelogError::DiffUnavailable("fetch failed".to_string()))
        }
    }

    fn setup(content: Option<&str>) -> (TempDir, ChangelogConfig) {
        let dir = tempdir().unwrap();
        if let Some(content) = content {
            fs::write(dir.path().join("CHANGELOG.md"), content).unwrap();
        }
        let config = ChangelogConfig {
            source_prefixes: vec!["src/".to_string(), "tests/".to_string()],
            ..ChangelogConfig::default()
        };
        (dir, config)
    }

    fn run(
        dir: &TempDir,
        config: &ChangelogConfig,
        merge_event: bool,
        diff: FixedDiff,
    ) -> ValidationReport {
        let context = PipelineContext {
            merge_event,
            target_branch: None,
        };
        let detector = ChangeDetector::new(config, context);
        let path = dir.path().join(&config.changelog_file);
        Validator::new(&path, config, &detector, &diff).run()
    }

    const VALID: &str = "# Changelog\nhttps://keepachangelog.com\n\n## [Unreleased]\n";

    #[test]
    fn test_missing_file_short_circuits() {
        let (dir, config) = setup(None);
        let report = run(&dir, &config, true, FixedDiff(Some(vec!["src/app.py"])));
        assert_eq!(report.stage(), ValidationStage::Failed);
        assert_eq!(report.checks.len(), 1);
        assert!(report.checks[0].is_failure());
        assert_eq!(
            report.history(),
            [
                ValidationStage::NotRun,
                ValidationStage::Existence,
                ValidationStage::Failed
            ]
        );
    }

    #[test]
    fn test_stages_visited_in_order() {
        let (dir, config) = setup(Some(VALID));
        let report = run(&dir, &config, false, FixedDiff(None));
        assert_eq!(
            report.history(),
            [
                ValidationStage::NotRun,
                ValidationStage::Existence,
                ValidationStage::UpdateCheck,
                ValidationStage::FormatCheck,
                ValidationStage::Done
            ]
        );
    }

    #[test]
    fn test_warnings_kept_when_format_fails() {
        let (dir, config) = setup(Some("# Changelog\n"));
        let report = run(&dir, &config, false, FixedDiff(None));
        assert!(matches!(
            report.check(CheckKind::Format),
            Some(CheckOutcome::Failed { .. })
        ));
        assert_eq!(
            report.warnings,
            vec![FormatWarning::MissingReference {
                url: "https://keepachangelog.com".to_string()
            }]
        );
    }

    #[test]
    fn test_source_change_without_changelog_fails() {
        let (dir, config) = setup(Some(VALID));
        let report = run(&dir, &config, true, FixedDiff(Some(vec!["src/app.py"])));
        assert!(!report.passed());
        match report.check(CheckKind::UpdateRequired) {
            Some(CheckOutcome::Failed { reason, .. }) => {
                assert_eq!(reason, "source changed but CHANGELOG.md not updated");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(
            report.check(CheckKind::Format),
            Some(CheckOutcome::Passed(_))
        ));
    }

    #[test]
    fn test_source_change_with_changelog_passes() {
        let (dir, config) = setup(Some(VALID));
        let report = run(
            &dir,
            &config,
            true,
            FixedDiff(Some(vec!["src/app.py", "CHANGELOG.md"])),
        );
        assert!(report.passed());
        assert_eq!(report.stage(), ValidationStage::Done);
    }

    #[test]
    fn test_docs_only_change_passes() {
        let (dir, config) = setup(Some(VALID));
        let report = run(&dir, &config, true, FixedDiff(Some(vec!["docs/readme.md"])));
        assert!(report.passed());
        assert!(matches!(
            report.check(CheckKind::UpdateRequired),
            Some(CheckOutcome::Passed(_))
        ));
    }

    #[test]
    fn test_unavailable_diff_is_skipped_not_failed() {
        let (dir, config) = setup(Some(VALID));
        let report = run(&dir, &config, true, FixedDiff(None));
        assert!(report.passed());
        assert!(matches!(
            report.check(CheckKind::UpdateRequired),
            Some(CheckOutcome::Skipped(_))
        ));
    }

    #[test]
    fn test_outside_merge_context_update_check_skipped() {
        let (dir, config) = setup(Some(VALID));
        let report = run(&dir, &config, false, FixedDiff(Some(vec!["src/app.py"])));
        assert!(report.passed());
        assert!(matches!(
            report.check(CheckKind::UpdateRequired),
            Some(CheckOutcome::Skipped(_))
        ));
    }

    #[test]
    fn test_all_failures_reported_together() {
        let (dir, config) = setup(Some("# Changelog\n"));
        let report = run(&dir, &config, true, FixedDiff(Some(vec!["tests/test_app.py"])));
        assert_eq!(report.stage(), ValidationStage::Failed);
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_missing_reference_is_only_a_warning() {
        let (dir, config) = setup(Some("## [Unreleased]\n"));
        let report = run(&dir, &config, false, FixedDiff(None));
        assert!(report.passed());
        assert_eq!(report.warnings.len(), 1);
    }
}
