//! # Parse-Tree Recorder
//!
//! A live tree of parser activations, one node per parser invocation.
//! [`Parser::run`](crate::parser::Parser::run) opens an activation
//! before invoking a parser body and closes it on exit with the end
//! position and outcome; the tree is retained for the whole parse so a
//! failure at the top level can be rendered as a source-annotated
//! diagnostic (see [`render`]).
//!
//! Two construction-time parser flags shape what the renderer sees:
//!
//! - **ignored** - the activation is omitted from diagnostics and its
//!   children are re-parented to its recorded parent.
//! - **splicing** - a parser marked as a region start has its internal
//!   activations elided from diagnostics; parsers marked as region ends
//!   stop the elision, so their subtrees render normally. Combinators
//!   use this to keep rendered trees readable despite deep
//!   compositional nesting.
//!
//! Region depth and the elided flag are computed per node at creation
//! from its parent, so enter/exit pairs are well-nested by construction.

mod render;

pub(crate) use render::render;

/// Diagnostic flags carried by every parser, applied to each of its
/// activations at creation.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Flags {
    /// Omit the activation from diagnostics, promoting its children.
    pub ignored: bool,
    /// Start a splicer region: elide descendants from diagnostics.
    pub collapse: bool,
    /// End a splicer region: render this subtree normally.
    pub expose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    InProgress,
    Success,
    Failure,
}

/// One parser invocation.
#[derive(Debug)]
pub(crate) struct Activation {
    pub label: String,
    /// Cursor offset at entry.
    pub start: usize,
    /// Cursor offset at exit; equals `start` for failures, which have
    /// their cursor effect undone before the activation closes.
    pub end: usize,
    pub outcome: Outcome,
    /// Child activations, in spawn order.
    pub children: Vec<usize>,
    pub ignored: bool,
    /// Inside a splicer region and neither a start nor an end boundary.
    pub elided: bool,
    /// Open splicer regions governing this node's children.
    region: u32,
    /// Completion order among closed activations; 0 while in progress.
    pub closed_seq: usize,
}

/// Arena of activations plus the stack of currently-open ones.
pub(crate) struct Trace {
    pub nodes: Vec<Activation>,
    stack: Vec<usize>,
    seq: usize,
}

impl Trace {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stack: Vec::new(),
            seq: 0,
        }
    }

    /// Open an activation as a child of the currently-active one and
    /// make it current. Returns its id for the matching [`exit`].
    ///
    /// [`exit`]: Trace::exit
    pub fn enter(&mut self, label: &str, start: usize, flags: Flags) -> usize {
        let (parent_region, parent) = match self.stack.last().copied() {
            Some(p) => (self.nodes[p].region, Some(p)),
            None => (0, None),
        };
        let elided = parent_region > 0 && !flags.collapse && !flags.expose;
        let region = parent_region.saturating_sub(u32::from(flags.expose)) + u32::from(flags.collapse);
        let id = self.nodes.len();
        self.nodes.push(Activation {
            label: label.to_string(),
            start,
            end: start,
            outcome: Outcome::InProgress,
            children: Vec::new(),
            ignored: flags.ignored,
            elided,
            region,
            closed_seq: 0,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        self.stack.push(id);
        id
    }

    /// Close the activation opened by the matching [`enter`], recording
    /// the end position and outcome, and pop back to its parent.
    ///
    /// [`enter`]: Trace::enter
    pub fn exit(&mut self, id: usize, end: usize, success: bool) {
        debug_assert_eq!(self.stack.last().copied(), Some(id));
        self.seq += 1;
        let node = &mut self.nodes[id];
        node.end = end;
        node.outcome = if success {
            Outcome::Success
        } else {
            Outcome::Failure
        };
        node.closed_seq = self.seq;
        self.stack.pop();
    }

    pub fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Children of `id` as the renderer sees them: ignored and elided
    /// nodes are skipped, with their own children promoted in place.
    pub fn visible_children(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_visible(id, &mut out);
        out
    }

    fn collect_visible(&self, id: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[id].children {
            let node = &self.nodes[child];
            if node.ignored || node.elided {
                self.collect_visible(child, out);
            } else {
                out.push(child);
            }
        }
    }
}
