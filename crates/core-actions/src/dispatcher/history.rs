//! History navigation and incremental search.

use core_history::SearchDirection;
use core_text::to_code_points;
use tracing::trace;

use super::DispatchResult;
use crate::ActionContext;

fn show(ctx: &mut ActionContext<'_>, entry: Option<Vec<char>>) -> DispatchResult {
    match entry {
        Some(chars) => {
            ctx.console.replace_line(&chars);
            DispatchResult::dirty()
        }
        None => DispatchResult::clean(),
    }
}

/// Step to the previous entry. The line being edited is remembered on the
/// first step so `next-history` can return to it.
pub(crate) fn previous_history(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if !ctx.history.is_enabled() {
        return DispatchResult::clean();
    }
    if !ctx.history.is_navigating() {
        let current = ctx.console.buffer().as_string();
        ctx.history.set_current(&current);
    }
    let entry = ctx.history.previous_fetch().map(to_code_points);
    trace!(target: "actions.dispatch", op = "previous_history", found = entry.is_some(), "history");
    show(ctx, entry)
}

pub(crate) fn next_history(ctx: &mut ActionContext<'_>) -> DispatchResult {
    if !ctx.history.is_enabled() || !ctx.history.is_navigating() {
        return DispatchResult::clean();
    }
    let entry = ctx.history.next_fetch().map(to_code_points);
    trace!(target: "actions.dispatch", op = "next_history", found = entry.is_some(), "history");
    show(ctx, entry)
}

/// Search with the line as it was when the search started; repeated
/// searches keep that term and continue from the previous hit.
fn search(ctx: &mut ActionContext<'_>, direction: SearchDirection) -> DispatchResult {
    if !ctx.history.is_enabled() {
        return DispatchResult::clean();
    }
    let line = ctx.console.buffer().as_string();
    let term = ctx.search_term.get_or_insert(line).clone();
    if term.is_empty() {
        *ctx.search_term = None;
        return DispatchResult::clean();
    }
    ctx.history.set_search_direction(direction);
    let hit = ctx.history.search(&term).map(to_code_points);
    trace!(target: "actions.dispatch", op = "search", ?direction, found = hit.is_some(), "history");
    show(ctx, hit)
}

pub(crate) fn reverse_search_history(ctx: &mut ActionContext<'_>) -> DispatchResult {
    search(ctx, SearchDirection::Reverse)
}

pub(crate) fn forward_search_history(ctx: &mut ActionContext<'_>) -> DispatchResult {
    search(ctx, SearchDirection::Forward)
}
