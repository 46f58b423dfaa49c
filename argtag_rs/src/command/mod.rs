//! The command model and everything that builds or describes it.
//!
//! - `node`: the arena tree, its nodes and positional formals
//! - `register`: turning records into nodes, tree validation
//! - `flags`: per-node flag sets and their parsing
//! - `help`: usage text

mod flags;
mod help;
mod node;
mod register;

pub use flags::{Flag, FlagSet};
pub use node::{Command, CommandTree, Formal, NodeId};

pub(crate) use flags::FlagError;
