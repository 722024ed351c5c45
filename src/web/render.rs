//! HTML pages. Everything user supplied goes through `html_escape`.

use crate::core::preview::summary_line;
use crate::domain::model::FilterOutcome;
use crate::web::form::FilterForm;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
header { padding: 1rem 2rem; border-bottom: 1px solid #ddd; }
header p { margin: .25rem 0 0; color: #666; }
.layout { display: flex; align-items: flex-start; }
aside { width: 18rem; padding: 1rem 2rem; border-right: 1px solid #eee; }
aside label { display: block; margin-top: .6rem; font-size: .85rem; }
aside input[type=text] { width: 100%; box-sizing: border-box; }
main { flex: 1; padding: 1rem 2rem; overflow-x: auto; }
table { border-collapse: collapse; font-size: .85rem; }
th, td { border: 1px solid #ddd; padding: .3rem .5rem; text-align: left; vertical-align: top; }
th { background: #f6f6f6; }
.notice { padding: .6rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
.info { background: #e8f0fe; }
.success { background: #e6f4ea; }
.warning { background: #fef7e0; }
.error { background: #fce8e6; }
"#;

#[derive(Debug, Clone, Copy)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

pub fn notice(kind: NoticeKind, message: &str) -> String {
    format!(
        r#"<div class="notice {}">{}</div>"#,
        kind.class(),
        text(message)
    )
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Massage Therapist Finder</title>
<style>{}</style>
</head>
<body>
<header>
<h1>Massage Therapist Finder</h1>
<p>Upload your CSV/Excel, set filters, and download your shortlist.</p>
</header>
{}
</body>
</html>"#,
        STYLE, body
    )
}

fn upload_form() -> &'static str {
    r#"<form method="post" action="/upload" enctype="multipart/form-data">
<label for="file">Upload a CSV, TSV or Excel file</label>
<input type="file" id="file" name="file" accept=".csv,.tsv,.xlsx,.xls,text/csv,text/tab-separated-values">
<button type="submit">Upload</button>
</form>"#
}

/// Landing page shown while the session holds no file.
pub fn upload_page(message: Option<(NoticeKind, &str)>) -> String {
    let notice_html = match message {
        Some((kind, msg)) => notice(kind, msg),
        None => notice(NoticeKind::Info, "Upload your file to begin."),
    };
    layout(&format!(
        r#"<main>{}{}</main>"#,
        notice_html,
        upload_form()
    ))
}

fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label>{label}<input type="text" name="{name}" value="{value}"></label>"#,
        label = text(label),
        name = name,
        value = attr(value)
    )
}

fn filter_sidebar(form: &FilterForm) -> String {
    let inputs = [
        text_input("city", "City equals", &form.city),
        text_input("neighborhood", "Neighborhood contains", &form.neighborhood),
        text_input("gender", "Gender equals", &form.gender),
        text_input("price_min", "Price min", &form.price_min),
        text_input("price_max", "Price max (0 = no max)", &form.price_max),
        text_input("rating_min", "Rating min (0-5)", &form.rating_min),
        text_input("reviews_min", "Reviews min", &form.reviews_min),
        text_input("years_min", "Min years experience", &form.years_min),
        format!(
            r#"<label><input type="checkbox" name="mobile" value="on"{}> Require mobile / in-home service</label>"#,
            if form.mobile_only() { " checked" } else { "" }
        ),
        text_input(
            "modalities",
            "Require ALL modalities (comma/semicolon)",
            &form.modalities,
        ),
        text_input(
            "languages",
            "Require ALL languages (comma/semicolon)",
            &form.languages,
        ),
        text_input(
            "days",
            "Availability includes any of these days (comma)",
            &form.days,
        ),
        text_input(
            "keywords",
            "Keywords in Bio/Credentials (comma)",
            &form.keywords,
        ),
        text_input("sort", "Sort by (e.g., price,-rating)", &form.sort),
    ];

    format!(
        r#"<aside>
<h2>Filters</h2>
<form method="get" action="/">
{}
<p><button type="submit">Apply</button> <a href="/">Clear</a></p>
</form>
<form method="post" action="/reset"><button type="submit">Upload a different file</button></form>
</aside>"#,
        inputs.join("\n")
    )
}

fn results_table(outcome: &FilterOutcome, max_rows: usize) -> String {
    let header_html: String = outcome
        .view
        .headers()
        .iter()
        .map(|h| format!("<th>{}</th>", text(h)))
        .collect();

    let rows_html: String = outcome
        .view
        .rows()
        .take(max_rows)
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<td>{}</td>", text(cell)))
                .collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();

    format!(
        "<table>\n<thead><tr>{}</tr></thead>\n<tbody>\n{}</tbody>\n</table>",
        header_html, rows_html
    )
}

pub struct ResultsPage<'a> {
    pub file_name: &'a str,
    pub form: &'a FilterForm,
    pub outcome: Result<FilterOutcome, String>,
    pub max_rows: usize,
}

pub fn results_page(page: &ResultsPage<'_>) -> String {
    let mut main = format!("<p>File: <strong>{}</strong></p>\n", text(page.file_name));

    match &page.outcome {
        Ok(outcome) => {
            main.push_str(&notice(NoticeKind::Success, &summary_line(&outcome.view)));

            if !outcome.report.skipped.is_empty() {
                let lines: Vec<String> = outcome
                    .report
                    .skipped
                    .iter()
                    .map(|s| s.line.to_string())
                    .collect();
                main.push_str(&notice(
                    NoticeKind::Warning,
                    &format!(
                        "Skipped {} malformed rows (lines {}).",
                        outcome.report.skipped.len(),
                        lines.join(", ")
                    ),
                ));
            }
            if !outcome.ignored_sort_keys.is_empty() {
                main.push_str(&notice(
                    NoticeKind::Warning,
                    &format!(
                        "Sort keys not found: {}",
                        outcome.ignored_sort_keys.join(", ")
                    ),
                ));
            }
            if outcome.view.matched() > page.max_rows {
                main.push_str(&notice(
                    NoticeKind::Info,
                    &format!(
                        "Showing the first {} rows. Download the CSV for all of them.",
                        page.max_rows
                    ),
                ));
            }

            main.push_str(&results_table(outcome, page.max_rows));

            let query = page.form.query_string();
            let href = if query.is_empty() {
                "/download".to_string()
            } else {
                format!("/download?{}", query)
            };
            main.push_str(&format!(
                r#"<p><a href="{}">Download results as CSV</a></p>"#,
                attr(&href)
            ));
        }
        Err(message) => main.push_str(&notice(NoticeKind::Error, message)),
    }

    layout(&format!(
        r#"<div class="layout">{}<main>{}</main></div>"#,
        filter_sidebar(page.form),
        main
    ))
}
