//! Arena-backed command tree.

use std::any::Any;

use crate::coerce::Parser;
use crate::config::RenderConfig;
use crate::record::Behavior;

use super::flags::FlagSet;

/// Index of a node inside its [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// One positional parameter.
#[derive(Debug, Clone)]
pub struct Formal {
    pub(crate) name: String,
    pub(crate) field: &'static str,
    pub(crate) doc: String,
    pub(crate) optional: bool,
    pub(crate) rest: bool,
    pub(crate) min: usize,
    pub(crate) parser: Parser,
}

impl Formal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether this formal absorbs all remaining arguments.
    pub fn is_rest(&self) -> bool {
        self.rest
    }

    /// Minimum number of arguments a rest formal needs.
    pub fn min(&self) -> usize {
        self.min
    }
}

/// One command or command group.
pub struct Command<C: 'static = ()> {
    pub(crate) name: String,
    pub(crate) usage: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) flags: FlagSet,
    pub(crate) formals: Vec<Formal>,
    pub(crate) behavior: Behavior<C>,
}

impl<C: 'static> Command<C> {
    pub(crate) fn new(name: &str, usage: &str, behavior: Behavior<C>) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.trim().to_string(),
            parent: None,
            children: Vec::new(),
            flags: FlagSet::default(),
            formals: Vec::new(),
            behavior,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn formals(&self) -> &[Formal] {
        &self.formals
    }

    pub fn is_runnable(&self) -> bool {
        self.behavior.is_runnable()
    }
}

/// A tree of commands rooted at the program itself.
///
/// Nodes are only added, never removed, so a [`NodeId`] stays valid for the
/// life of the tree.
pub struct CommandTree<C: 'static = ()> {
    pub(crate) nodes: Vec<Command<C>>,
    pub(crate) render: RenderConfig,
}

impl<C: 'static> CommandTree<C> {
    /// A tree whose root is a pure group named `name`.
    pub fn new(name: &str) -> Self {
        Self {
            nodes: vec![Command::new(name, "", Behavior::None)],
            render: RenderConfig::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Command<C> {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    pub fn set_render_config(&mut self, config: RenderConfig) {
        self.render = config;
    }

    /// The child of `id` named `name`, if any.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    /// Space-separated names from the root down to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cur = Some(id);
        while let Some(node) = cur {
            names.push(self.node(node).name.as_str());
            cur = self.node(node).parent;
        }
        names.reverse();
        names.join(" ")
    }

    /// Typed read-back of the record registered at `id`.
    pub fn behavior<T: Any>(&self, id: NodeId) -> Option<&T> {
        self.node(id).behavior.as_any()?.downcast_ref::<T>()
    }
}
