use std::{
    fmt,
    panic::{self, UnwindSafe},
    path::PathBuf,
    process,
};

use color_eyre::{Report, Section, config::HookBuilder, owo_colors::style};
use futures_util::FutureExt;
use tokio::sync::mpsc;

/// Type alias for a [Result] with [AppError] as the error type
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Top-level error of the application
#[derive(Debug)]
pub enum AppError {
    /// An expected error, that should be reported to the user
    UserFacing(UserFacingError),
    /// An unexpected error, most likely a bug or an infrastructure issue
    Unexpected(Report),
}

/// Errors terminating a define run, reported to the user as a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFacingError {
    /// There's no selected text to define
    EmptySelection,
    /// The call to the language model failed or returned no payload
    NetworkFailure(String),
    /// The language model replied with something that isn't a valid term definition
    MalformedResponse(String),
    /// A note already exists at the computed path
    NoteAlreadyExists(String),
    /// The vault rejected a folder or file creation
    FilesystemFailure(String),
}

impl fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserFacingError::EmptySelection => write!(f, "There's no text selected"),
            UserFacingError::NetworkFailure(reason) => write!(f, "Language model request failed: {reason}"),
            UserFacingError::MalformedResponse(reason) => write!(f, "Language model response is not valid: {reason}"),
            UserFacingError::NoteAlreadyExists(path) => write!(f, "A note already exists at {path}"),
            UserFacingError::FilesystemFailure(reason) => write!(f, "Couldn't write to the vault: {reason}"),
        }
    }
}

impl std::error::Error for UserFacingError {}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UserFacing(err) => err.fmt(f),
            AppError::Unexpected(report) => report.fmt(f),
        }
    }
}

impl AppError {
    /// Converts this error into a [Report]
    pub fn into_report(self) -> Report {
        match self {
            AppError::UserFacing(err) => Report::new(err),
            AppError::Unexpected(report) => report,
        }
    }
}

impl From<UserFacingError> for AppError {
    fn from(err: UserFacingError) -> Self {
        Self::UserFacing(err)
    }
}

/// Error type for vault operations
#[derive(Debug)]
pub enum VaultError {
    /// The entry already exists
    AlreadyExists,
    /// An unexpected error occurred
    Unexpected(Report),
}

macro_rules! impl_from_report {
    ($err:ty) => {
        impl<T> From<T> for $err
        where
            T: Into<Report>,
        {
            fn from(err: T) -> Self {
                Self::Unexpected(err.into())
            }
        }
    };
}
impl_from_report!(VaultError);

// AppError can't use the macro, as UserFacingError is also Into<Report>
impl From<Report> for AppError {
    fn from(err: Report) -> Self {
        Self::Unexpected(err)
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Unexpected(err.into())
    }
}

/// Initializes error and panics handling
pub async fn init<F>(log_path: Option<PathBuf>, fut: F) -> color_eyre::Result<()>
where
    F: Future<Output = color_eyre::Result<()>> + UnwindSafe,
{
    tracing::trace!("Initializing error handlers");
    let panic_section = if let Some(log_path) = log_path {
        format!(
            "This is a bug. Consider reporting it to the {} maintainers\nLogs can be found at {}",
            env!("CARGO_PKG_NAME"),
            log_path.display()
        )
    } else {
        format!(
            "This is a bug. Consider reporting it to the {} maintainers\nLogs were not generated, consider enabling \
             them on the config or running with GLOSSARY_LOG=debug.",
            env!("CARGO_PKG_NAME")
        )
    };
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(panic_section.clone())
        .display_env_section(false)
        .display_location_section(true)
        .capture_span_trace_by_default(true)
        .into_hooks();

    // Panics are reported once, after the main future is dropped
    let (panic_tx, mut panic_rx) = mpsc::channel(1);

    eyre_hook.install()?;
    panic::set_hook(Box::new(move |panic_info| {
        let panic_report = panic_hook.panic_report(panic_info).to_string();
        tracing::error!("Error: {}", strip_ansi_escapes::strip_str(&panic_report));
        if panic_tx.try_send(panic_report).is_err() {
            tracing::error!("Error sending panic report");
            process::exit(2);
        }
    }));

    let res = Box::pin(fut).catch_unwind().await;
    match res {
        Ok(r) => r
            .with_section(move || panic_section)
            .inspect_err(|err| tracing::error!("Error: {}", strip_ansi_escapes::strip_str(format!("{err:?}")))),
        Err(err) => {
            if let Ok(report) = panic_rx.try_recv() {
                eprintln!("{report}");
            } else if let Some(err) = err.downcast_ref::<&str>() {
                print_panic_msg(err, &panic_section);
            } else if let Some(err) = err.downcast_ref::<String>() {
                print_panic_msg(err, &panic_section);
            } else {
                eprintln!(
                    "{}\n\n{panic_section}",
                    style().bright_red().style("An unexpected panic happened")
                );
                tracing::error!("An unexpected panic happened");
            }
            process::exit(1);
        }
    }
}

fn print_panic_msg(err: impl AsRef<str>, panic_section: &str) {
    let err = err.as_ref();
    eprintln!(
        "{}\nMessage: {}\n\n{panic_section}",
        style().bright_red().style("The application panicked (crashed)."),
        style().blue().style(err)
    );
    tracing::error!("Panic: {err}");
}
