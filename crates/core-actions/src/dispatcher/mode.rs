//! Vi layer transitions (insert <-> command).

use core_keymap::Layer;

use super::DispatchResult;
use crate::ActionContext;

/// Leave insert: the cursor steps back onto the last typed character.
pub(crate) fn vi_movement_mode(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if *ctx.layer == Layer::Command {
        return DispatchResult::clean();
    }
    *ctx.layer = Layer::Command;
    ctx.console.end_insert_run();
    ctx.console.buffer_mut().move_cursor(-1);
    tracing::trace!(target: "actions.dispatch", op = "vi_movement_mode", "mode");
    DispatchResult::dirty()
}

pub(crate) fn vi_insert_mode(ctx: &mut ActionContext<'_>) -> DispatchResult {
    *ctx.layer = Layer::Insert;
    DispatchResult::clean()
}

pub(crate) fn vi_append_mode(ctx: &mut ActionContext<'_>) -> DispatchResult {
    *ctx.layer = Layer::Insert;
    ctx.console.buffer_mut().move_cursor(1);
    DispatchResult::dirty()
}

pub(crate) fn vi_insert_beginning_of_line(ctx: &mut ActionContext<'_>) -> DispatchResult {
    *ctx.layer = Layer::Insert;
    ctx.console.buffer_mut().set_cursor(0);
    DispatchResult::dirty()
}

pub(crate) fn vi_append_end_of_line(ctx: &mut ActionContext<'_>) -> DispatchResult {
    *ctx.layer = Layer::Insert;
    let len = ctx.console.buffer().len();
    ctx.console.buffer_mut().set_cursor(len);
    DispatchResult::dirty()
}
