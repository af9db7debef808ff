use crate::ui;
use anyhow::{Context, Result, bail};
use changelog::{ChangelogConfig, ChangelogDocument};
use std::path::Path;

/// Writes a fresh changelog, refusing to overwrite an existing one
pub fn init(path: &Path, config: &ChangelogConfig) -> Result<()> {
    ui::section_header("Changelog Init");

    if path.exists() {
        bail!(
            "{} already exists, remove it first to start over",
            path.display()
        );
    }

    ChangelogDocument::template(&config.reference_url)
        .save(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    ui::success_message(&format!("Created {}", path.display()));
    ui::info_message("Add entries with `chlog add`");
    Ok(())
}

/// Prints the Unreleased entries grouped by category
pub fn show(path: &Path) -> Result<()> {
    let document = ChangelogDocument::load(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if document.find_unreleased_line().is_none() {
        bail!("{} has no '## [Unreleased]' section", path.display());
    }

    ui::section_header("Unreleased");
    let groups = document.unreleased_entries();
    if groups.iter().all(|(_, entries)| entries.is_empty()) {
        ui::info_message("No unreleased changes");
        return Ok(());
    }

    for (category, entries) in groups {
        println!("{}", category.heading());
        for (idx, entry) in entries.iter().enumerate() {
            ui::step_message(idx + 1, entry);
        }
    }
    Ok(())
}
