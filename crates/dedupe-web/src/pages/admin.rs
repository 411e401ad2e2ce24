//! User admin: consultants derived from the audit trail, read-only.

use dedupe_core::metrics::Consultant;

use super::{esc, text_input};

/// Consultants whose name contains `query`, case-insensitively.
pub fn filter<'a>(consultants: &'a [Consultant], query: Option<&str>) -> Vec<&'a Consultant> {
  let query = query.map(str::trim).unwrap_or_default().to_lowercase();
  consultants
    .iter()
    .filter(|c| query.is_empty() || c.name.to_lowercase().contains(&query))
    .collect()
}

pub fn render(consultants: &[Consultant], query: Option<&str>) -> String {
  let shown = filter(consultants, query);
  let rows: String = shown
    .iter()
    .map(|c| {
      format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
        esc(&c.name),
        c.last_active.format("%Y-%m-%d %H:%M"),
        c.decisions
      )
    })
    .collect();
  let table = if shown.is_empty() {
    r#"<p class="muted">No consultants found.</p>"#.to_owned()
  } else {
    format!("<table><tr><th>Consultant</th><th>Last active (UTC)</th><th>Decisions</th></tr>{rows}</table>")
  };
  format!(
    r#"<form method="get" action="/" class="filters">
  {search}
  <button type="submit">Search</button>
</form>
<p class="muted">{shown} of {total} consultants</p>
{table}"#,
    search = text_input("q", "Name", query),
    shown = shown.len(),
    total = consultants.len(),
  )
}
