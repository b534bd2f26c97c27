//! Tab completion.
//!
//! Completers are asked in registration order; the first one that produces
//! candidates wins. One candidate is inserted (with its separator), several
//! candidates insert their common prefix, and when there is no prefix left to
//! insert the candidates are listed below the line.

use core_completion::CompleteOperation;
use core_text::{
    find_starts_with, format_display_compact_list, switch_spaces_to_escaped_spaces_in_word,
    to_code_points,
};
use tracing::trace;

use super::DispatchResult;
use super::enter::LINE_BREAK;
use crate::ActionContext;

fn insertion(op: &CompleteOperation, text: &str) -> String {
    if op.ignore_non_escaped_space() {
        text.to_string()
    } else {
        switch_spaces_to_escaped_spaces_in_word(text)
    }
}

pub(crate) fn complete(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let line = ctx.console.buffer().as_string();
    let cursor = ctx.console.buffer().cursor();
    let op = ctx.completers.iter().find_map(|completer| {
        let mut op = CompleteOperation::new(&line, cursor);
        completer.complete(&mut op);
        (!op.candidates().is_empty()).then_some(op)
    });
    let Some(op) = op else {
        trace!(target: "actions.dispatch", op = "complete", candidates = 0, "complete");
        return DispatchResult::clean();
    };
    let formatted = op.formatted_candidates();
    trace!(target: "actions.dispatch", op = "complete", candidates = formatted.len(), offset = op.offset(), "complete");

    if let [single] = formatted.as_slice() {
        let mut text = insertion(&op, single);
        if op.append_separator() {
            text.push(op.separator());
        }
        ctx.console.insert_discrete(&to_code_points(&text));
        return DispatchResult::dirty();
    }

    if !op.ignore_starts_with() {
        let prefix = find_starts_with(&formatted);
        if !prefix.is_empty() {
            ctx.console
                .insert_discrete(&to_code_points(&insertion(&op, &prefix)));
            return DispatchResult::dirty();
        }
    }

    let listing = format_display_compact_list(op.candidates(), ctx.terminal_width);
    ctx.console.write_out(LINE_BREAK);
    for row in listing.lines() {
        ctx.console.write_out(row);
        ctx.console.write_out(LINE_BREAK);
    }
    DispatchResult::dirty()
}
