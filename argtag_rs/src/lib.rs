//! # argtag
//!
//! **Declarative command trees** - describe a command's flags and positional
//! arguments as annotated fields of a plain struct, and let the framework
//! turn an argument vector into a populated struct and run it.
//!
//! ## Features
//!
//! - **Annotated fields** - `#[arg("flag=n, how many")]` makes a flag,
//!   `#[arg("name=FILE, input file")]` a positional argument
//! - **Typed coercion** - strings, booleans, sized integers, floats,
//!   durations (`1h30m`) and comma-separated lists, with `oneof=a|b|c`
//!   choice lists
//! - **Optional and rest arguments** - `opt=` and trailing `Vec<T>` fields
//!   with a `min=` count
//! - **Nested sub-commands** - groups with their own flags and `before` hooks
//! - **Usage errors** - exit code 2 and the offending command's usage block
//!
//! ## Quick Start
//!
//! ```rust
//! use argtag::{CommandTree, Runnable};
//!
//! argtag::record! {
//!     #[derive(Default)]
//!     struct Greet {
//!         #[arg("flag=n, repeat `count` times")]
//!         times: u32,
//!         #[arg("name=WHO, who to greet")]
//!         who: String,
//!     }
//! }
//!
//! impl Runnable for Greet {
//!     fn run(&mut self, _ctx: &()) -> anyhow::Result<()> {
//!         for _ in 0..self.times.max(1) {
//!             println!("hello, {}", self.who);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut tree: CommandTree = CommandTree::new("hello");
//! tree.command(tree.root(), "greet", Greet::default(), "say hello")?;
//!
//! let args = ["greet", "-n", "2", "world"].map(String::from);
//! let code = tree.main_with_args(&(), &args, &mut std::io::stdout(), &mut std::io::stderr());
//! assert_eq!(code, 0);
//! # Ok::<(), argtag::RegistrationError>(())
//! ```
//!
//! ## Tag Syntax
//!
//! A tag is a comma-separated list of `key=value` entries followed by free
//! documentation text. Keys are `flag`, `name`, `doc`, `oneof`, `min` and
//! `opt`. Fields without `#[arg]` are not visible on the command line.

/// String-to-value coercion.
pub mod coerce;

/// The command model: nodes, registration, flag sets and usage text.
pub mod command;

/// Read-only view for shell completion engines.
pub mod complete;

/// Usage rendering configuration (TOML).
pub mod config;

mod dispatch;
mod entrypoint;

/// Error types and exit codes.
pub mod error;

/// Records and behaviours.
pub mod record;

/// Field annotation grammar.
pub mod tag;

/// Tagged values and field types.
pub mod value;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use command::{Command, CommandTree, Flag, FlagSet, Formal, NodeId};
pub use complete::{CompletionView, Predictor};
pub use config::RenderConfig;
pub use error::{
    CoercionError, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE, Error, RegistrationError, UsageError,
    ValueError,
};
pub use record::{Behavior, FieldDescriptor, Group, Record, Runnable};
pub use tag::Tag;
pub use value::{FieldType, Kind, Value};
