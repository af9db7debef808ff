use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use changelog::{Category, ChangelogDocument, ChangelogError, validate_message};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::Path;
use tracing::info;

/// What the user asked for, once flags and prompts are resolved
#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Insert { category: Category, message: String },
    Cancelled,
}

pub fn execute(path: &Path, category: Option<String>, message: Option<String>) -> Result<()> {
    ui::section_header("Add Changelog Entry");

    // Validate everything that can fail before prompting
    let category = category.as_deref().map(str::parse::<Category>).transpose()?;
    if let Some(message) = &message {
        validate_message(message)?;
    }
    let mut document = ChangelogDocument::load(path)?;
    if document.find_unreleased_line().is_none() {
        return Err(ChangelogError::NoUnreleasedSection.into());
    }

    let request = match (category, message) {
        (Some(category), Some(message)) => Request::Insert { category, message },
        (category, message) => prompt(category, message)?,
    };

    let Request::Insert { category, message } = request else {
        ui::info_message("Cancelled, changelog left unchanged");
        return Ok(());
    };

    let line = document.insert_entry(category, &message)?;
    document
        .save(path)
        .with_context(|| format!("Failed to update {}", path.display()))?;

    info!(%category, line = line + 1, "changelog entry added");
    ui::success_message(&format!(
        "Added to {} under '{}' (line {})",
        path.display(),
        category.heading(),
        line + 1
    ));
    Ok(())
}

fn prompt(category: Option<Category>, message: Option<String>) -> Result<Request> {
    if !atty::is(atty::Stream::Stdin) {
        let missing = if category.is_none() {
            "--category"
        } else {
            "--message"
        };
        return Err(CliError::NotInteractive(missing));
    }

    let theme = ColorfulTheme::default();

    let category = match category {
        Some(category) => category,
        None => {
            let items: Vec<String> = Category::ALL
                .iter()
                .enumerate()
                .map(|(idx, category)| format!("{}. {category}", idx + 1))
                .collect();
            let Some(choice) = Select::with_theme(&theme)
                .with_prompt("Select the type of change")
                .items(&items)
                .default(0)
                .interact_opt()?
            else {
                return Ok(Request::Cancelled);
            };
            Category::ALL[choice]
        }
    };

    let message = match message {
        Some(message) => message,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Describe the change")
            .allow_empty(true)
            .interact_text()?,
    };
    let entry = validate_message(&message)?;

    ui::step_message(1, &category.heading());
    ui::step_message(2, &format!("- {entry}"));
    let confirmed = Confirm::with_theme(&theme)
        .with_prompt("Add this entry to the changelog?")
        .default(false)
        .interact()?;

    Ok(if confirmed {
        Request::Insert { category, message }
    } else {
        Request::Cancelled
    })
}
