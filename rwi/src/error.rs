use wordindex::WordIndexError;

use crate::ui::UiError;

/// The kind of command error
#[derive(Debug)]
pub enum CommandError {
    /// The command aborted with the given error message
    Abort { message: Vec<u8> },
    /// The standard output stream cannot be written to
    StdoutError,
    /// The standard error stream cannot be written to
    StderrError,
}

impl CommandError {
    pub fn abort(message: impl AsRef<str>) -> Self {
        CommandError::Abort {
            message: message.as_ref().as_bytes().to_owned(),
        }
    }
}

impl From<WordIndexError> for CommandError {
    fn from(error: WordIndexError) -> Self {
        CommandError::abort(error.to_string())
    }
}

impl From<UiError> for CommandError {
    fn from(error: UiError) -> Self {
        match error {
            UiError::StdoutError(_) => CommandError::StdoutError,
            UiError::StderrError(_) => CommandError::StderrError,
        }
    }
}
