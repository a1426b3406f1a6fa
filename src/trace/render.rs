//! Renders a parse failure as a multi-line, source-annotated block.
//!
//! ```text
//! line 1:
//!   foowat
//!      V    * failure: literal("bar")
//!   \-/     * failure: (literal("foo") >> literal("bar"))
//!   \-/     * success: literal("foo")
//! ```
//!
//! The left gutter draws each activation's span in columns of the
//! failing line; the right side names the activation. Failure rows come
//! first, deepest activation on top so the most recent failure sits
//! closest to the source line; success rows follow in reverse
//! completion order.

use super::{Outcome, Trace};
use crate::input::Input;

pub(crate) fn render(input: &Input, trace: &Trace, at: usize) -> String {
    let (line_no, _) = input.line_col(at);
    let (line_start, line_end) = input.line_window(at);
    let line_text = input.slice(line_start, line_end);
    let line_width = line_end - line_start;

    // (gutter, failed, label) per rendered row.
    let mut rows: Vec<(String, bool, String)> = Vec::new();

    let path = failure_path(trace);
    for &id in path.iter().rev() {
        let node = &trace.nodes[id];
        if let Some(gutter) = span_row(node.start, at, line_start, line_end) {
            rows.push((gutter, true, node.label.clone()));
        }
    }

    let mut successes: Vec<usize> = Vec::new();
    for &id in &path {
        for child in trace.visible_children(id) {
            if trace.nodes[child].outcome == Outcome::Success {
                successes.push(child);
            }
        }
    }
    successes.sort_by_key(|&id| std::cmp::Reverse(trace.nodes[id].closed_seq));
    for id in successes {
        let node = &trace.nodes[id];
        if let Some(gutter) = span_row(node.start, node.end, line_start, line_end) {
            rows.push((gutter, false, node.label.clone()));
        }
    }

    let gutter_width = rows
        .iter()
        .map(|(gutter, _, _)| gutter.len())
        .max()
        .unwrap_or(0)
        .max(line_width)
        + 2;

    let mut out = format!("line {line_no}:\n  {line_text}\n");
    for (gutter, failed, label) in rows {
        let kind = if failed { "failure" } else { "success" };
        let pad = " ".repeat(gutter_width - gutter.len());
        out.push_str(&format!("  {gutter}{pad}* {kind}: {label}\n"));
    }
    out.truncate(out.trim_end().len());
    out
}

/// The chain of activations that carried the failure to the top:
/// starting from the root, repeatedly descend into the last failed
/// visible child. The last propagated failure is always the last failed
/// child, because alternation records retried branches before the one
/// whose failure it re-raises.
fn failure_path(trace: &Trace) -> Vec<usize> {
    let mut path = Vec::new();
    let Some(root) = trace.root() else { return path };

    let root_node = &trace.nodes[root];
    let mut frontier = if root_node.ignored || root_node.elided {
        trace.visible_children(root)
    } else {
        vec![root]
    };
    loop {
        let next = frontier
            .iter()
            .rev()
            .copied()
            .find(|&id| trace.nodes[id].outcome == Outcome::Failure);
        match next {
            Some(id) => {
                path.push(id);
                frontier = trace.visible_children(id);
            }
            None => break,
        }
    }
    if path.is_empty() {
        path.push(root);
    }
    path
}

/// Draw the span `[start, end)` over the displayed line `[ls, le)`.
///
/// Spans cover inclusive columns: a zero-width span is a single `V` at
/// its position, a wider one is `\`, dashes, `/`. A span clipped by the
/// line loses its endpoint character on the clipped side and runs as
/// dashes to the edge. Returns `None` when the span lies entirely
/// outside the line.
fn span_row(start: usize, end: usize, ls: usize, le: usize) -> Option<String> {
    let width = (le - ls) as isize;
    let (first, last) = if end <= start {
        (start as isize, start as isize)
    } else {
        (start as isize, end as isize - 1)
    };
    let first = first - ls as isize;
    let last = last - ls as isize;
    if last < 0 || first > width {
        return None;
    }

    let clip_left = first < 0;
    let clip_right = last > width;
    let a = first.max(0) as usize;
    let b = last.min(width) as usize;

    let mut row = " ".repeat(a);
    if a == b {
        row.push(if clip_left || clip_right { '-' } else { 'V' });
    } else {
        row.push(if clip_left { '-' } else { '\\' });
        for _ in (a + 1)..b {
            row.push('-');
        }
        row.push(if clip_right { '-' } else { '/' });
    }
    Some(row)
}
