//! `accept-line`: decide whether Enter finishes the read or continues it.
//!
//! Order of checks, first match wins:
//! 1. Masked input finishes immediately and never reaches history.
//! 2. A comment line (`#` after leading whitespace) is discarded and the read
//!    continues.
//! 3. A trailing unescaped backslash, or an unterminated quote that the
//!    quote-continuation setting does not exempt, folds the line into the
//!    multi-line buffer and the read continues under the continuation prompt.
//! 4. Otherwise the joined multi-line text is pushed to history (when enabled
//!    and not blank) and handed to the reader.
//!
//! The undo stack is cleared on every Enter.

use core_config::QuoteContinuation;
use core_text::{QuoteKinds, contains_open_quote, is_trimmed_empty, to_code_points, trim};
use tracing::debug;

use super::DispatchResult;
use crate::ActionContext;

/// Raw-mode line break.
pub(crate) const LINE_BREAK: &str = "\r\n";

const COMMENT_MARKER: char = '#';

fn quote_kinds(setting: QuoteContinuation) -> Option<QuoteKinds> {
    match setting {
        QuoteContinuation::Enabled => Some(QuoteKinds::BOTH),
        QuoteContinuation::Disabled => None,
        QuoteContinuation::IgnoreDoubleQuotes => Some(QuoteKinds::SINGLE_ONLY),
        QuoteContinuation::IgnoreSingleQuotes => Some(QuoteKinds::DOUBLE_ONLY),
    }
}

/// Odd run of trailing backslashes: the last one escapes the line break.
fn ends_with_continuation(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Runs the checks above for one Enter press. A finished line that is empty
/// or whitespace only is still delivered but never stored in history, so
/// navigation does not stop on blank entries.
pub(crate) fn accept_line(ctx: &mut ActionContext<'_>) -> DispatchResult {
    ctx.console.clear_undo();

    if ctx.console.buffer().is_masking() {
        let line = ctx.console.buffer().multi_line_text();
        debug!(target: "actions.dispatch", op = "accept_line", outcome = "masked", "enter");
        finish(ctx, line);
        return DispatchResult::clean();
    }

    let current = ctx.console.buffer().as_string();
    let trimmed = trim(&current);

    if trimmed.starts_with(COMMENT_MARKER) {
        ctx.console.buffer_mut().replace(&[]);
        ctx.console.write_out(LINE_BREAK);
        debug!(target: "actions.dispatch", op = "accept_line", outcome = "comment", "enter");
        return DispatchResult::dirty();
    }

    let backslash = ends_with_continuation(&trimmed);
    let open_quote = !backslash
        && quote_kinds(ctx.flags.quote_continuation).is_some_and(|kinds| {
            contains_open_quote(&ctx.console.buffer().multi_line_text(), kinds)
        });
    if backslash || open_quote {
        let buffer = ctx.console.buffer_mut();
        if backslash {
            buffer.replace(&to_code_points(current.trim_end()));
        }
        buffer.set_multi_line(true);
        buffer.append_to_multi_line();
        ctx.console.write_out(LINE_BREAK);
        debug!(target: "actions.dispatch", op = "accept_line", outcome = "continue", backslash, open_quote, "enter");
        return DispatchResult::dirty();
    }

    let line = ctx.console.buffer().multi_line_text();
    if ctx.history.is_enabled() && !is_trimmed_empty(&to_code_points(&line)) {
        ctx.history.push(&line);
    }
    debug!(target: "actions.dispatch", op = "accept_line", outcome = "finish", len = line.len(), "enter");
    finish(ctx, line);
    DispatchResult::clean()
}

fn finish(ctx: &mut ActionContext<'_>, line: String) {
    let len = ctx.console.buffer().len();
    if ctx.console.buffer().cursor() != len {
        ctx.console.buffer_mut().set_cursor(len);
        ctx.console.draw_line();
    }
    ctx.console.write_out(LINE_BREAK);
    ctx.finish_line(line);
    ctx.console.reset();
}
