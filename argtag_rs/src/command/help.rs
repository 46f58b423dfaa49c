//! Usage text.

use super::node::{CommandTree, NodeId};

impl<C: 'static> CommandTree<C> {
    /// `path [flags] ARG1 ARG2...` for one command.
    pub fn usage_header(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut header = self.path(id);
        if !node.flags.is_empty() {
            header.push_str(" [flags]");
        }
        for formal in &node.formals {
            header.push(' ');
            header.push_str(&formal.name);
            if formal.rest {
                header.push_str("...");
            }
        }
        header
    }

    /// Usage block of a single command, without its sub-commands.
    pub fn usage(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_usage(&mut out, id, true);
        out
    }

    /// Usage block of a command followed by the blocks of all commands
    /// beneath it.
    pub fn full_usage(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_full(&mut out, id, true);
        out
    }

    /// What help and usage errors show: the full listing for a group,
    /// the single block for a leaf.
    pub(crate) fn help_text(&self, id: NodeId) -> String {
        if self.node(id).children.is_empty() {
            self.usage(id)
        } else {
            self.full_usage(id)
        }
    }

    fn write_full(&self, out: &mut String, id: NodeId, single: bool) {
        self.write_usage(out, id, single);
        for child in &self.node(id).children {
            self.write_full(out, *child, false);
        }
    }

    fn write_usage(&self, out: &mut String, id: NodeId, single: bool) {
        let node = self.node(id);
        let header = self.usage_header(id);
        let doc = &node.usage;
        if doc.is_empty() {
            out.push_str(&format!("{header}\n"));
        } else if single && header.len() + doc.len() <= self.render.line_width {
            out.push_str(&format!("{header}    {doc}\n"));
        } else {
            out.push_str(&format!("{header}\n  {doc}\n"));
        }
        let width = self.render.column_width;
        for formal in node.formals.iter().filter(|f| !f.doc.is_empty()) {
            out.push_str(&format!("  {:<width$} {}\n", formal.name, formal.doc));
        }
        out.push_str(&node.flags.render_defaults());
        out.push('\n');
    }
}
