//! Read-only view of the command tree for shell completion engines.

use crate::command::{CommandTree, NodeId};

/// Possible values for a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predictor {
    /// Free-form value; nothing to offer.
    Anything,
    /// Boolean flag; takes `true` or `false` after `=`.
    Toggle,
    /// Restricted choice list, in declaration order.
    OneOf(Vec<String>),
}

impl Predictor {
    /// Candidates that start with `prefix`.
    pub fn predict(&self, prefix: &str) -> Vec<String> {
        let candidates: Vec<&str> = match self {
            Predictor::Anything => Vec::new(),
            Predictor::Toggle => vec!["true", "false"],
            Predictor::OneOf(choices) => choices.iter().map(String::as_str).collect(),
        };
        candidates
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }
}

/// One node of a tree, seen from a completion engine.
pub struct CompletionView<'a, C: 'static = ()> {
    tree: &'a CommandTree<C>,
    id: NodeId,
}

impl<C: 'static> Clone for CompletionView<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: 'static> Copy for CompletionView<'_, C> {}

impl<'a, C: 'static> CompletionView<'a, C> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.tree.node(self.id).name()
    }

    /// Sub-command names in registration order.
    pub fn sub_commands(&self) -> Vec<&'a str> {
        let tree = self.tree;
        tree.node(self.id)
            .children()
            .iter()
            .map(|child| tree.node(*child).name())
            .collect()
    }

    pub fn sub(&self, name: &str) -> Option<CompletionView<'a, C>> {
        self.tree.find_child(self.id, name).map(|id| CompletionView {
            tree: self.tree,
            id,
        })
    }

    /// Flag names in registration order.
    pub fn flags(&self) -> Vec<&'a str> {
        self.tree.node(self.id).flags().names()
    }

    pub fn predictor(&self, flag: &str) -> Option<Predictor> {
        let flag = self.tree.node(self.id).flags().lookup(flag)?;
        let predictor = match flag.choices() {
            Some(choices) => Predictor::OneOf(choices.to_vec()),
            None if flag.is_toggle() => Predictor::Toggle,
            None => Predictor::Anything,
        };
        Some(predictor)
    }
}

impl<C: 'static> CommandTree<C> {
    /// Completion view rooted at `id`.
    pub fn completion(&self, id: NodeId) -> CompletionView<'_, C> {
        CompletionView { tree: self, id }
    }
}
