//! Undo dispatch. Snapshots live in the `ConsoleBuffer`'s `UndoStack`; there
//! is no redo.

use super::DispatchResult;
use crate::ActionContext;

pub(crate) fn undo(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if ctx.console.undo() {
        tracing::trace!(target: "actions.dispatch", op = "undo", depth = ctx.console.undo_stack().depth(), "undo");
        DispatchResult::dirty()
    } else {
        DispatchResult::clean()
    }
}
