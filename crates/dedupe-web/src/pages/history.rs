//! Decision history: the audit trail, newest first.

use dedupe_core::decision::{HistoryEntry, HistorySummary};

use super::{esc, or_dash, priority_badge, score_badge};

pub fn render(entries: &[HistoryEntry]) -> String {
  let summary = HistorySummary::of(entries);
  if entries.is_empty() {
    return r#"<p class="muted">No decisions recorded yet.</p>"#.to_owned();
  }
  let rows: String = entries
    .iter()
    .map(|e| {
      format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} / {}</td><td>{}</td><td>{}</td>\
         <td>{}</td><td>{}</td><td>{}</td></tr>",
        e.decision_timestamp.format("%Y-%m-%d %H:%M:%S"),
        esc(&e.agent_name),
        esc(&e.candidate_id),
        esc(&e.customer_id_1),
        esc(&e.customer_id_2),
        score_badge(e.match_score),
        priority_badge(e.priority),
        e.decision,
        or_dash(e.decision_reason.as_deref()),
        or_dash(e.notes.as_deref()),
      )
    })
    .collect();
  format!(
    r#"<div class="cards">
  <div class="card"><div class="value">{total}</div><div class="label">Decisions shown</div></div>
  <div class="card"><div class="value">{matched}</div><div class="label">Matched</div></div>
  <div class="card"><div class="value">{not_matched}</div><div class="label">Not matched</div></div>
</div>
<table>
<tr><th>When (UTC)</th><th>Agent</th><th>Candidate</th><th>Customers</th><th>Score</th>
<th>Priority</th><th>Decision</th><th>Reason</th><th>Notes</th></tr>
{rows}
</table>"#,
    total = summary.total,
    matched = summary.matched,
    not_matched = summary.not_matched,
  )
}
