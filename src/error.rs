/// Fatal application error.
///
/// Per-event problems never become an `AppError`; they are absorbed by the
/// resolver as [`crate::resolve::SkipReason`]s. Only failures that invalidate the
/// whole run (unreadable inputs, unwritable output, bad configuration) end up here.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

/// Exit code for input/output artifact failures.
pub const EXIT_IO: u8 = 2;
/// Exit code for configuration failures.
pub const EXIT_CONFIG: u8 = 3;

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
