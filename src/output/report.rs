use std::borrow::Cow;
use std::fmt::Write as _;

use thiserror::Error;

use super::DisplayRow;

pub const ROWS_MARKER: &str = "{{rows}}";

const BLOCKED_URL: &str = "about:invalid#blocked";

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

const SAFE_IMAGE_TYPES: &[&str] = &["png", "jpeg", "jpg", "gif", "webp", "bmp", "avif"];

const DEFAULT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>Crawl Report</title>
  <link rel="stylesheet" type="text/css" href="https://cdn.datatables.net/1.10.25/css/jquery.dataTables.min.css">
  <link rel="stylesheet" type="text/css" href="https://cdn.datatables.net/buttons/2.2.3/css/buttons.dataTables.min.css">
  <link rel="stylesheet" type="text/css" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/5.15.4/css/all.min.css">
  <link rel="stylesheet" type="text/css" href="https://cdn.jsdelivr.net/npm/bootstrap@4.6.1/dist/css/bootstrap.min.css">
  <script src="https://code.jquery.com/jquery-3.6.0.min.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/bootstrap@4.6.1/dist/js/bootstrap.bundle.min.js"></script>
  <script src="https://cdnjs.cloudflare.com/ajax/libs/jszip/3.10.1/jszip.min.js"></script>
  <script src="https://cdn.datatables.net/1.10.25/js/jquery.dataTables.min.js"></script>
  <script src="https://cdn.datatables.net/buttons/2.2.3/js/dataTables.buttons.min.js"></script>
  <script src="https://cdn.datatables.net/buttons/2.2.3/js/buttons.html5.min.js"></script>
  <script src="https://cdn.datatables.net/buttons/2.2.3/js/buttons.print.min.js"></script>
  <style>
    td img {
      max-width: 240px;
      max-height: 160px;
    }
  </style>
  <script type="text/javascript" class="init">
    $(document).ready(function() {
      $('#datatable').DataTable({
        dom: 'Bfrtip',
        lengthMenu: [[100, 250, 500, -1], [100, 250, 500, 'All']],
        buttons: ['copy', 'csv', 'excel', 'print']
      });
    });
  </script>
</head>
<body>
  <table id="datatable" class="display" style="width:100%">
    <thead>
      <tr>
        <th>Response URL</th>
        <th>Title</th>
        <th>Redirects</th>
        <th>Screenshot</th>
        <th>Path</th>
        <th>Status Code</th>
      </tr>
    </thead>
    <tbody>
{{rows}}    </tbody>
  </table>
</body>
</html>
"##;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no rows marker")]
    MissingMarker,

    #[error("template has more than one rows marker")]
    DuplicateMarker,
}

/// Page skeleton with a single `{{rows}}` slot for the table body.
#[derive(Clone, Debug)]
pub struct ReportTemplate {
    source: Cow<'static, str>,
}

impl ReportTemplate {
    pub fn new(source: impl Into<Cow<'static, str>>) -> Result<Self, TemplateError> {
        let source = source.into();
        match source.matches(ROWS_MARKER).count() {
            0 => Err(TemplateError::MissingMarker),
            1 => Ok(Self { source }),
            _ => Err(TemplateError::DuplicateMarker),
        }
    }

    fn split(&self) -> (&str, &str) {
        self.source
            .split_once(ROWS_MARKER)
            .unwrap_or((&*self.source, ""))
    }
}

impl Default for ReportTemplate {
    fn default() -> Self {
        Self {
            source: Cow::Borrowed(DEFAULT_TEMPLATE),
        }
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn normalize_absolute_url(value: &str) -> Option<String> {
    // Browsers drop leading controls and embedded tabs/newlines before parsing.
    let cleaned: String = value
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let end = cleaned.find([':', '/', '?', '#'])?;
    if !cleaned[end..].starts_with(':') {
        return None;
    }
    let scheme = &cleaned[..end];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return None;
    }
    Some(cleaned.to_ascii_lowercase())
}

fn is_safe_image_data(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("data:image/") else {
        return false;
    };
    let subtype = rest.split([';', ',']).next().unwrap_or_default();
    SAFE_IMAGE_TYPES.contains(&subtype)
}

/// Returns `value` if it is safe to place in a URL attribute, or an inert
/// placeholder otherwise. `image` widens the allowed set for `img src`.
pub fn filter_url(value: &str, image: bool) -> &str {
    let Some(url) = normalize_absolute_url(value) else {
        return value;
    };
    let scheme = url.split(':').next().unwrap_or_default();
    let allowed = SAFE_SCHEMES.contains(&scheme)
        || (image && (scheme == "file" || is_safe_image_data(&url)));
    if allowed {
        value
    } else {
        BLOCKED_URL
    }
}

fn push_textarea(out: &mut String, value: &str) {
    let _ = writeln!(
        out,
        "        <td><textarea rows=\"5\" cols=\"30\" readonly>{}</textarea></td>",
        escape_html(value)
    );
}

fn render_row(row: &DisplayRow, out: &mut String) {
    out.push_str("      <tr>\n");
    push_textarea(out, &row.url);
    push_textarea(out, &row.title);
    push_textarea(out, &row.redirects_text);
    let _ = writeln!(
        out,
        "        <td><a href=\"{}\" target=\"_blank\" rel=\"noreferrer\"><img src=\"{}\" alt=\"screenshot\" loading=\"lazy\"></a></td>",
        escape_html(filter_url(&row.url, false)),
        escape_html(filter_url(&row.screenshot, true)),
    );
    push_textarea(out, &row.path);
    let _ = writeln!(out, "        <td>{}</td>", row.status_code);
    out.push_str("      </tr>\n");
}

pub fn render_html(rows: &[DisplayRow], template: &ReportTemplate) -> String {
    let (head, tail) = template.split();
    let mut out = String::with_capacity(head.len() + tail.len() + rows.len() * 512);
    out.push_str(head);
    for row in rows {
        render_row(row, &mut out);
    }
    out.push_str(tail);
    out
}
