//! Cursor movement within the line.
//!
//! In the vi command layer the cursor rests on a character, so it never goes
//! past the last one.

use core_keymap::Layer;

use super::DispatchResult;
use crate::ActionContext;

fn move_to(ctx: &mut ActionContext<'_>, target: usize) -> DispatchResult {
    let buffer = ctx.console.buffer_mut();
    let before = buffer.cursor();
    let limit = if *ctx.layer == Layer::Command {
        buffer.len().saturating_sub(1)
    } else {
        buffer.len()
    };
    buffer.set_cursor(target.min(limit));
    let after = buffer.cursor();
    tracing::trace!(target: "actions.dispatch", from = before, to = after, "motion");
    if before != after {
        DispatchResult::dirty()
    } else {
        DispatchResult::clean()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

pub(crate) fn forward_char(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let target = ctx.console.buffer().cursor() + 1;
    move_to(ctx, target)
}

pub(crate) fn backward_char(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let target = ctx.console.buffer().cursor().saturating_sub(1);
    move_to(ctx, target)
}

pub(crate) fn beginning_of_line(ctx: &mut ActionContext<'_>) -> DispatchResult {
    move_to(ctx, 0)
}

pub(crate) fn end_of_line(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let target = ctx.console.buffer().len();
    move_to(ctx, target)
}

/// Skip to the end of the next word.
pub(crate) fn forward_word(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let line = ctx.console.buffer().line();
    let mut pos = ctx.console.buffer().cursor();
    while pos < line.len() && !is_word_char(line[pos]) {
        pos += 1;
    }
    while pos < line.len() && is_word_char(line[pos]) {
        pos += 1;
    }
    move_to(ctx, pos)
}

/// Skip to the start of the previous word.
pub(crate) fn backward_word(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let line = ctx.console.buffer().line();
    let mut pos = ctx.console.buffer().cursor();
    while pos > 0 && !is_word_char(line[pos - 1]) {
        pos -= 1;
    }
    while pos > 0 && is_word_char(line[pos - 1]) {
        pos -= 1;
    }
    move_to(ctx, pos)
}
