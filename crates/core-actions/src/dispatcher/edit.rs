//! Text edits: deletes, kills, yank and case change.
//!
//! Every edit goes through a `ConsoleBuffer` helper, which records the undo
//! snapshot and feeds removed text to the kill-ring.

use core_keymap::Layer;
use core_state::Mask;

use super::DispatchResult;
use crate::ActionContext;

fn changed(n: usize) -> DispatchResult {
    if n > 0 {
        DispatchResult::dirty()
    } else {
        DispatchResult::clean()
    }
}

fn hidden_mask(ctx: &ActionContext<'_>) -> bool {
    ctx.console.buffer().prompt().mask() == Some(Mask::Hidden)
}

/// Delete the character under the cursor. In the vi command layer the cursor
/// steps back when the last character was removed so it stays on a character.
pub(crate) fn delete_char(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if hidden_mask(ctx) {
        ctx.console.delete_with_mask_enabled();
        return DispatchResult::clean();
    }
    let cursor = ctx.console.buffer().cursor();
    let len = ctx.console.buffer().len();
    let removed = ctx.console.delete_forward(1);
    if removed > 0 && *ctx.layer == Layer::Command && cursor + 1 == len && cursor > 0 {
        ctx.console.buffer_mut().move_cursor(-1);
    }
    tracing::trace!(target: "actions.dispatch", op = "delete_char", cursor, removed, "edit");
    changed(removed)
}

pub(crate) fn backward_delete_char(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if hidden_mask(ctx) {
        ctx.console.delete_with_mask_enabled();
        return DispatchResult::clean();
    }
    let removed = ctx.console.delete_previous(1);
    tracing::trace!(target: "actions.dispatch", op = "backward_delete_char", removed, "edit");
    changed(removed)
}

/// Toggle the case of the character under the cursor and step past it.
pub(crate) fn change_case_char(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let cursor = ctx.console.buffer().cursor();
    let Some(&c) = ctx.console.buffer().line().get(cursor) else {
        return DispatchResult::clean();
    };
    let toggled = if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c.to_uppercase().next().unwrap_or(c)
    };
    ctx.console.replace_char(toggled, cursor);
    ctx.console.buffer_mut().move_cursor(1);
    DispatchResult::dirty()
}

pub(crate) fn kill_line(ctx: &mut ActionContext<'_>) -> DispatchResult {
    changed(ctx.console.kill_to_end())
}

pub(crate) fn unix_line_discard(ctx: &mut ActionContext<'_>) -> DispatchResult {
    changed(ctx.console.kill_to_start())
}

/// Kill from the start of the word before the cursor up to the cursor.
pub(crate) fn backward_kill_word(ctx: &mut ActionContext<'_>) -> DispatchResult {
    let line = ctx.console.buffer().line();
    let cursor = ctx.console.buffer().cursor();
    let mut start = cursor;
    while start > 0 && line[start - 1] == ' ' {
        start -= 1;
    }
    while start > 0 && line[start - 1] != ' ' {
        start -= 1;
    }
    changed(ctx.console.delete_range(start, cursor))
}

pub(crate) fn yank(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if ctx.console.yank() {
        DispatchResult::dirty()
    } else {
        DispatchResult::clean()
    }
}
