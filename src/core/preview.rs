use crate::domain::model::CandidateView;

pub const DEFAULT_PREVIEW_ROWS: usize = 30;
pub const MAX_COLUMN_WIDTH: usize = 80;

fn truncate(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        cell.to_string()
    } else {
        let mut out: String = cell.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

/// Plain text table of the first `limit` rows, plus a match summary line.
pub fn render_text_table(view: &CandidateView, limit: usize) -> String {
    let headers: Vec<String> = view
        .headers()
        .iter()
        .map(|h| truncate(h, MAX_COLUMN_WIDTH))
        .collect();
    let rows: Vec<Vec<String>> = view
        .rows()
        .take(limit)
        .map(|row| row.iter().map(|c| truncate(c, MAX_COLUMN_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(&headers));
    lines.extend(rows.iter().map(|row| format_line(row)));
    if view.matched() > limit {
        lines.push(format!("... {} more rows", view.matched() - limit));
    }
    lines.push(summary_line(view));
    lines.join("\n")
}

pub fn summary_line(view: &CandidateView) -> String {
    format!(
        "Matched {} of {} candidates.",
        view.matched(),
        view.total()
    )
}
