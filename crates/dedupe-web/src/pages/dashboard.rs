//! Dashboard: greeting, progress, activity, region board, recent decisions.

use dedupe_core::{
  decision::HistoryEntry,
  metrics::{ActivityBucket, ActivityMetrics, DashboardMetrics, Region},
};

use super::{action_button, esc, score_badge};

pub struct Dashboard<'a> {
  pub greeting:   &'static str,
  pub agent_name: &'a str,
  pub metrics:    &'a DashboardMetrics,
  pub activity:   &'a ActivityMetrics,
  pub board:      &'a [(Region, u64)],
  pub recent:     &'a [HistoryEntry],
}

pub fn render(d: &Dashboard<'_>) -> String {
  let m = d.metrics;
  let pct = m.completion_pct();
  let avg = m
    .avg_match_score
    .map(|s| format!("{s:.1}%"))
    .unwrap_or_else(|| "&#8212;".to_owned());

  format!(
    r#"<p class="greeting">{greeting}, {agent}!</p>
<div class="cards">
  {total}{pending}{matched}{not_matched}{high}
  <div class="card"><div class="value">{avg}</div><div class="label">Avg match score</div></div>
</div>
<div class="progress" title="{pct:.1}% complete"><div style="width:{pct:.1}%"></div></div>
<p class="muted">{pct:.1}% of candidates reviewed</p>
<p>{start}{queue}</p>
<h3>Your activity</h3>
<table>
<tr><th>Period</th><th>Completed</th><th>Matched</th><th>Not matched</th></tr>
{today}{week}{month}
</table>
<h3>Pending by region</h3>
<div class="cards">{board}</div>
<h3>Recent decisions</h3>
{recent}"#,
    greeting = esc(d.greeting),
    agent = esc(d.agent_name),
    total = card(m.total, "Total candidates"),
    pending = card(m.pending, "Pending review"),
    matched = card(m.matched, "Matched"),
    not_matched = card(m.not_matched, "Not matched"),
    high = card(m.high_priority_pending, "High priority pending"),
    start = action_button("start_high_priority", &[], "Start high priority", "primary"),
    queue = action_button("navigate", &[("view", "work_queue")], "Open work queue", ""),
    today = activity_row("Today", &d.activity.today),
    week = activity_row("This week", &d.activity.week_to_date),
    month = activity_row("This month", &d.activity.month_to_date),
    board = d.board.iter().map(|(r, n)| region_tile(r, *n)).collect::<String>(),
    recent = recent_table(d.recent),
  )
}

fn card(value: u64, label: &str) -> String {
  format!(
    r#"<div class="card"><div class="value">{value}</div><div class="label">{}</div></div>"#,
    esc(label)
  )
}

fn activity_row(label: &str, b: &ActivityBucket) -> String {
  format!(
    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
    esc(label),
    b.completed,
    b.matched,
    b.not_matched
  )
}

fn region_tile(region: &Region, count: u64) -> String {
  format!(
    r#"<div class="card"><div class="value">{count}</div><div class="label">{} · {}</div></div>"#,
    esc(&region.code),
    esc(&region.name)
  )
}

fn recent_table(entries: &[HistoryEntry]) -> String {
  if entries.is_empty() {
    return r#"<p class="muted">No decisions recorded yet.</p>"#.to_owned();
  }
  let rows: String = entries
    .iter()
    .map(|e| {
      format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        e.decision_timestamp.format("%Y-%m-%d %H:%M"),
        esc(&e.candidate_id),
        score_badge(e.match_score),
        e.decision,
        esc(&e.agent_name),
      )
    })
    .collect();
  format!(
    "<table><tr><th>When</th><th>Candidate</th><th>Score</th><th>Decision</th><th>Agent</th></tr>{rows}</table>"
  )
}
