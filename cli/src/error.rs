use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Changelog error: {0}")]
    Changelog(#[from] changelog::ChangelogError),

    #[error("Invalid settings file: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),

    #[error("Dialoguer error: {0}")]
    DialoguerError(#[from] dialoguer::Error),

    #[error("{0} check(s) failed")]
    ValidationFailed(usize),

    #[error("Missing {0} and no terminal to prompt for it")]
    NotInteractive(&'static str),

    #[error("{0}: {1}")]
    WithContext(String, Box<CliError>),
}

impl CliError {
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Changelog(err) => err.user_message(),
            Self::Settings(err) => format!("Invalid settings file: {err}"),
            Self::AnyhowError(err) => format!("{err:#}"),
            Self::DialoguerError(err) => format!("UI interaction error: {err}"),
            Self::ValidationFailed(count) => format!("Changelog validation failed ({count} check(s))"),
            Self::NotInteractive(what) => {
                format!("Missing {what} and stdin is not a terminal to prompt for it")
            }
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }

    /// Remediation suggestion printed after the error message
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Changelog(err) => err.hint(),
            Self::NotInteractive(what) => Some(format!("Pass {what} on the command line")),
            Self::WithContext(_, err) => err.hint(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait ResultExt<T, E> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<CliError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let cli_err: CliError = err.into();
            cli_err.with_context(context())
        })
    }
}
