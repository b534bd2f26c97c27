//! Completion candidate grids.
//!
//! Both layouts fill column-major (down first, then across) and end every row
//! with `LINE_SEPARATOR`. Widths are visible widths, so styled candidates line
//! up like plain ones.

use crate::{LINE_SEPARATOR, visible_width};

const GUTTER: usize = 2;

fn pad_to(out: &mut String, item: &str, width: usize) {
    out.push_str(item);
    let used = visible_width(item);
    for _ in used..width {
        out.push(' ');
    }
}

/// Uniform grid: every column is as wide as the widest item plus a two-space
/// gutter, and every cell (including the last in a row) is padded.
pub fn format_display_list<S: AsRef<str>>(items: &[S], terminal_width: usize) -> String {
    if items.is_empty() {
        return String::new();
    }
    let max_width = items
        .iter()
        .map(|s| visible_width(s.as_ref()))
        .max()
        .unwrap_or(0);
    let column_width = max_width + GUTTER;
    let columns = (terminal_width / column_width).max(1);
    let rows = items.len().div_ceil(columns);

    let mut out = String::new();
    for row in 0..rows {
        for col in 0..columns {
            if let Some(item) = items.get(row + col * rows) {
                pad_to(&mut out, item.as_ref(), column_width);
            }
        }
        out.push_str(LINE_SEPARATOR);
    }
    out
}

/// Compact grid: each column is sized to its own widest item and the fewest
/// rows that fit `terminal_width` are used. The last cell of a row is not
/// padded. A single column is always accepted, even when it overflows.
pub fn format_display_compact_list<S: AsRef<str>>(items: &[S], terminal_width: usize) -> String {
    if items.is_empty() {
        return String::new();
    }
    let widths: Vec<usize> = items.iter().map(|s| visible_width(s.as_ref())).collect();

    let mut rows = 1;
    let column_widths = loop {
        let columns = items.len().div_ceil(rows);
        let column_widths: Vec<usize> = (0..columns)
            .map(|col| {
                let start = col * rows;
                let end = (start + rows).min(items.len());
                widths[start..end].iter().copied().max().unwrap_or(0)
            })
            .collect();
        let total: usize = column_widths.iter().map(|w| w + GUTTER).sum();
        if columns == 1 || total <= terminal_width {
            break column_widths;
        }
        rows += 1;
    };

    let mut out = String::new();
    for row in 0..rows {
        let cells: Vec<(usize, &str)> = column_widths
            .iter()
            .enumerate()
            .filter_map(|(col, _)| items.get(row + col * rows).map(|s| (col, s.as_ref())))
            .collect();
        for (i, (col, item)) in cells.iter().enumerate() {
            if i + 1 == cells.len() {
                out.push_str(item);
            } else {
                pad_to(&mut out, item, column_widths[*col] + GUTTER);
            }
        }
        out.push_str(LINE_SEPARATOR);
    }
    tracing::trace!(target: "text.display", items = items.len(), rows, columns = column_widths.len(), "compact_list");
    out
}
