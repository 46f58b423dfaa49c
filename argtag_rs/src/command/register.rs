//! Building the command tree from records.
//!
//! Each annotated field becomes either a flag (the tag has a `flag` key) or
//! a positional formal. All checks happen here, so a tree that registered
//! cleanly cannot fail dispatch because of its own declaration.

use tracing::debug;

use crate::coerce::build_parser;
use crate::error::RegistrationError;
use crate::record::{Behavior, FieldDescriptor, Group, Runnable};
use crate::tag::Tag;
use crate::value::Kind;

use super::flags::{Flag, FlagSet};
use super::node::{Command, CommandTree, Formal, NodeId};

impl<C: 'static> CommandTree<C> {
    /// A tree whose root command has its own behaviour and flags.
    pub fn with_root(
        name: &str,
        behavior: Behavior<C>,
        usage: &str,
    ) -> Result<Self, RegistrationError> {
        let mut root = Command::new(name, usage, behavior);
        let (flags, formals) = process_fields(name, &root.behavior.fields())?;
        root.flags = flags;
        root.formals = formals;
        let mut tree = Self::new(name);
        tree.nodes[0] = root;
        debug!(command = name, "registered root command");
        Ok(tree)
    }

    /// Add a sub-command under `parent`.
    pub fn register(
        &mut self,
        parent: NodeId,
        name: &str,
        behavior: Behavior<C>,
        usage: &str,
    ) -> Result<NodeId, RegistrationError> {
        let parent_node = self.node(parent);
        if name.is_empty() {
            return Err(RegistrationError::EmptyName(parent_node.name.clone()));
        }
        if !parent_node.formals.is_empty() {
            return Err(RegistrationError::ArgsAndSubcommands(
                parent_node.name.clone(),
            ));
        }
        if self.find_child(parent, name).is_some() {
            return Err(RegistrationError::DuplicateCommand(name.to_string()));
        }

        let mut command = Command::new(name, usage, behavior);
        let (flags, formals) = process_fields(name, &command.behavior.fields())?;
        command.flags = flags;
        command.formals = formals;
        command.parent = Some(parent);

        let id = NodeId(self.nodes.len());
        self.nodes.push(command);
        self.nodes[parent.0].children.push(id);
        debug!(
            command = %self.path(id),
            flags = self.node(id).flags.len(),
            formals = self.node(id).formals.len(),
            "registered command"
        );
        Ok(id)
    }

    /// Register a runnable sub-command.
    pub fn command<R>(
        &mut self,
        parent: NodeId,
        name: &str,
        record: R,
        usage: &str,
    ) -> Result<NodeId, RegistrationError>
    where
        R: Runnable<C> + 'static,
    {
        self.register(parent, name, Behavior::runnable(record), usage)
    }

    /// Register a group with no flags of its own.
    pub fn group(
        &mut self,
        parent: NodeId,
        name: &str,
        usage: &str,
    ) -> Result<NodeId, RegistrationError> {
        self.register(parent, name, Behavior::None, usage)
    }

    /// Register a group whose record declares flags.
    pub fn group_with<G>(
        &mut self,
        parent: NodeId,
        name: &str,
        record: G,
        usage: &str,
    ) -> Result<NodeId, RegistrationError>
    where
        G: Group<C> + 'static,
    {
        self.register(parent, name, Behavior::group(record), usage)
    }

    /// Check every node: one that cannot run must have sub-commands.
    pub fn validate_all(&self) -> Result<(), RegistrationError> {
        (0..self.nodes.len()).try_for_each(|i| self.validate(NodeId(i)))
    }

    pub(crate) fn validate(&self, id: NodeId) -> Result<(), RegistrationError> {
        let node = self.node(id);
        if !node.is_runnable() && node.children.is_empty() {
            return Err(RegistrationError::EmptyGroup(self.path(id)));
        }
        Ok(())
    }
}

/// Turn a record's field table into a flag set and a formal list.
pub(crate) fn process_fields(
    command: &str,
    fields: &[FieldDescriptor],
) -> Result<(FlagSet, Vec<Formal>), RegistrationError> {
    let mut flags = FlagSet::default();
    let mut formals: Vec<Formal> = Vec::new();
    for field in fields {
        let Some(tag) = field.tag else {
            continue;
        };
        process_field(field, tag, &mut flags, &mut formals).map_err(|source| {
            RegistrationError::Field {
                command: command.to_string(),
                field: field.name.to_string(),
                source: Box::new(source),
            }
        })?;
    }
    if let Some(i) = formals.iter().position(|f| f.rest) {
        if i != formals.len() - 1 {
            return Err(RegistrationError::RestNotLast(formals[i].name.clone()));
        }
    }
    Ok((flags, formals))
}

fn process_field(
    field: &FieldDescriptor,
    tag: &str,
    flags: &mut FlagSet,
    formals: &mut Vec<Formal>,
) -> Result<(), RegistrationError> {
    let tag = Tag::parse(tag)?;
    if tag.is_flag() && tag.name.as_deref().is_some_and(|n| !n.is_empty()) {
        return Err(RegistrationError::FlagAndName);
    }
    if tag.is_flag() && tag.opt.is_some() {
        return Err(RegistrationError::FlagAndOpt);
    }
    let parser = build_parser(&field.kind, &tag, tag.is_flag())?;

    if let Some(flag_name) = &tag.flag {
        let name = if flag_name.is_empty() {
            field.name.to_lowercase()
        } else {
            flag_name.clone()
        };
        let name = match name.strip_prefix('-') {
            Some(stripped) => stripped.to_string(),
            None => name,
        };
        let mut usage = tag.doc.clone();
        if !field.value.is_zero() {
            usage.push_str(&format!(" (default {})", field.value));
        }
        debug!(flag = %name, field = field.name, "registered flag");
        return flags.add(Flag {
            name,
            field: field.name,
            usage,
            default: field.value.clone(),
            toggle: field.kind == Kind::Bool,
            choices: tag.choices(),
            parser,
        });
    }

    if tag.opt.as_deref().is_some_and(|v| !v.is_empty()) {
        return Err(RegistrationError::OptHasValue);
    }
    let rest = field.kind.is_list();
    let min = match (&tag.min, rest) {
        (Some(min), true) => parse_min(min)?,
        (Some(_), false) => return Err(RegistrationError::MinWithoutSlice),
        (None, _) => 0,
    };
    let name = match tag.name {
        Some(name) if !name.is_empty() => name,
        _ => field.name.to_uppercase(),
    };
    // An optional formal makes every later one optional as well.
    let optional = tag.opt.is_some() || formals.last().is_some_and(|f| f.optional);
    debug!(formal = %name, field = field.name, optional, rest, "registered formal");
    formals.push(Formal {
        name,
        field: field.name,
        doc: tag.doc,
        optional,
        rest,
        min,
        parser,
    });
    Ok(())
}

fn parse_min(min: &str) -> Result<usize, RegistrationError> {
    let n: i64 = min.parse().map_err(RegistrationError::InvalidMin)?;
    usize::try_from(n).map_err(|_| RegistrationError::NegativeMin)
}
