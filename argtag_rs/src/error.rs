//! Error types for command declaration, value coercion and dispatch.
//!
//! [`RegistrationError`] describes a mistake in how a command tree was
//! declared and is reported at startup. [`Error`] is what a single
//! invocation can produce at runtime.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::value::Kind;

/// Exit code for a successful run or an explicit help request.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for a behaviour that returned a non-usage error.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for malformed flags or arguments, or an unknown command.
pub const EXIT_USAGE: i32 = 2;

/// Build-time errors: the command declaration itself is wrong.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("sub-command of {0} has no name")]
    EmptyName(String),

    #[error("{0}: a command cannot have both arguments and sub-commands")]
    ArgsAndSubcommands(String),

    #[error("duplicate sub-command: {0:?}")]
    DuplicateCommand(String),

    #[error("{0}: a group must have at least one sub-command")]
    EmptyGroup(String),

    #[error("empty key")]
    EmptyKey,

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("either 'flag' or 'name', but not both")]
    FlagAndName,

    #[error("either 'flag' or 'opt', but not both")]
    FlagAndOpt,

    #[error("\"opt\" should not have a value")]
    OptHasValue,

    #[error("empty oneof")]
    EmptyOneof,

    #[error("oneof must be string type, not {0}")]
    OneofNotString(Kind),

    #[error("cannot parse string into {0}")]
    Unsupported(Kind),

    #[error("min: {0}")]
    InvalidMin(#[source] ParseIntError),

    #[error("min cannot be negative")]
    NegativeMin,

    #[error("min is only for slice args")]
    MinWithoutSlice,

    #[error("{0:?} is a slice but not the last arg")]
    RestNotLast(String),

    #[error("empty flag name")]
    EmptyFlagName,

    #[error("flag name {0:?} is reserved")]
    ReservedFlag(String),

    #[error("duplicate flag: {0:?}")]
    DuplicateFlag(String),

    #[error("field {field:?} cannot be assigned: {source}")]
    Assign {
        field: String,
        #[source]
        source: ValueError,
    },

    #[error("command {command:?}, field {field:?}: {source}")]
    Field {
        command: String,
        field: String,
        #[source]
        source: Box<RegistrationError>,
    },
}

/// A string could not be coerced into the declared field type.
#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("must be one of: {}", .0.join(", "))]
    NotOneOf(Vec<String>),

    #[error("invalid boolean value {0:?}")]
    Bool(String),

    #[error(transparent)]
    Int(#[from] ParseIntError),

    #[error(transparent)]
    Float(#[from] ParseFloatError),

    #[error("value {0:?} out of range")]
    FloatRange(String),

    #[error(transparent)]
    Duration(#[from] humantime::DurationError),

    #[error("{input:?}: {source}")]
    Element {
        input: String,
        #[source]
        source: Box<CoercionError>,
    },
}

/// A record refused a value written through its field accessor.
#[derive(Debug, Clone, Error)]
pub enum ValueError {
    #[error("expected {expected}, got {found}")]
    Mismatch { expected: Kind, found: &'static str },

    #[error("{value} is out of range for {kind}")]
    OutOfRange { value: String, kind: Kind },

    #[error("no field named {0:?}")]
    UnknownField(String),
}

/// An error in how a command was invoked.
///
/// When a behaviour returns one of these (wrapped in `anyhow`), dispatch
/// attaches the innermost command it passed through, so the rendered form
/// carries that command's usage block.
#[derive(Debug, Clone)]
pub struct UsageError {
    message: String,
    command: Option<String>,
    usage: Option<String>,
    suggestion: Option<String>,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            command: None,
            usage: None,
            suggestion: None,
        }
    }

    /// The underlying message, without the command prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the command the error was attached to, if any yet.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Usage block of the attached command.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub(crate) fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub(crate) fn attach(mut self, command: impl Into<String>, usage: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self.usage = Some(usage.into());
        self
    }

    /// Full rendering: the error line, an optional suggestion, then the
    /// usage block of the originating command.
    pub fn render(&self) -> String {
        let mut out = format!("{self}\n");
        if let Some(suggestion) = &self.suggestion {
            out.push_str(&format!("Did you mean {suggestion:?}?\n"));
        }
        if let Some(usage) = &self.usage {
            out.push_str("Usage:\n");
            out.push_str(usage);
        }
        out
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            Some(command) => write!(f, "{}: {}", command, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for UsageError {}

/// Everything a single invocation of a command tree can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// `-h` or `--help` was given; carries the usage text to show.
    #[error("help requested")]
    Help { usage: String },

    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The tree is inconsistent in a way registration should have caught.
    #[error(transparent)]
    Invalid(#[from] RegistrationError),

    /// Whatever the invoked behaviour returned.
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

impl Error {
    /// Classify an error returned by a behaviour. A [`UsageError`] at the
    /// top of the chain stays a usage error; anything else is an execution
    /// failure.
    pub fn from_behavior(err: anyhow::Error) -> Self {
        match err.downcast::<UsageError>() {
            Ok(usage) => Error::Usage(usage),
            Err(other) => Error::Execution(other),
        }
    }

    pub fn is_help(&self) -> bool {
        matches!(self, Error::Help { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Help { .. } => EXIT_SUCCESS,
            Error::Usage(_) => EXIT_USAGE,
            Error::Invalid(_) | Error::Execution(_) => EXIT_FAILURE,
        }
    }
}
