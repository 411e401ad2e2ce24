//! Review screen: the two customer records side by side, the field diff, and
//! the decision form.

use dedupe_core::{
  candidate::DuplicateCandidate,
  customer::Customer,
  decision::DECISION_REASONS,
  diff::{FieldDiff, agreement},
};

use super::{action_button, esc, or_dash, priority_badge, score_badge, status_badge};

pub struct Review<'a> {
  pub candidate: &'a DuplicateCandidate,
  pub left:      &'a Customer,
  pub right:     &'a Customer,
  pub diffs:     &'a [FieldDiff],
  /// Pending candidates left after this one, skip list excluded.
  pub remaining: usize,
}

pub fn render(r: &Review<'_>) -> String {
  let c = r.candidate;
  let (matching, compared) = agreement(r.diffs);
  let decided = if c.status.is_pending() {
    String::new()
  } else {
    format!(
      r#"<div class="notice notice-warning">Already decided: {} by {}. A new decision will be recorded alongside it.</div>"#,
      status_badge(c.status),
      or_dash(c.assigned_to.as_deref())
    )
  };

  format!(
    r#"{decided}<p>
  <strong>{id}</strong> {score} {priority} {status}
  <span class="muted">{reason} · {matching} of {compared} fields agree · {remaining} more pending</span>
</p>
<table>
<tr><th>Field</th><th>{name_left}</th><th>{name_right}</th></tr>
{rows}
</table>
{form}
<p>{skip}{back}</p>"#,
    id = esc(&c.candidate_id),
    score = score_badge(c.match_score),
    priority = priority_badge(c.priority),
    status = status_badge(c.status),
    reason = or_dash(c.match_reason.as_deref()),
    remaining = r.remaining,
    name_left = or_dash(Some(r.left.full_name().as_str())),
    name_right = or_dash(Some(r.right.full_name().as_str())),
    rows = r.diffs.iter().map(diff_row).collect::<String>(),
    form = decision_form(&c.candidate_id),
    skip = action_button("skip", &[], "Skip", ""),
    back = action_button("back", &[], "Back to list", ""),
  )
}

fn diff_row(d: &FieldDiff) -> String {
  format!(
    r#"<tr class="{}"><th>{}</th><td>{}</td><td>{}</td></tr>"#,
    d.comparison.as_ref(),
    esc(d.label),
    or_dash(d.left.as_deref()),
    or_dash(d.right.as_deref()),
  )
}

fn decision_form(candidate_id: &str) -> String {
  let reasons: String = DECISION_REASONS
    .iter()
    .map(|r| format!(r#"<option value="{0}">{0}</option>"#, esc(r)))
    .collect();
  format!(
    r#"<form method="post" action="/decision" class="decision">
  <input type="hidden" name="candidate_id" value="{id}">
  <label>Reason <select name="decision_reason"><option value="">Select a reason</option>{reasons}</select></label>
  <label>Other reason <input type="text" name="custom_reason"></label>
  <label>Notes <textarea name="notes"></textarea></label>
  <p>
    <button type="submit" name="decision" value="MATCHED" class="primary">Match</button>
    <button type="submit" name="decision" value="NOT_MATCHED" class="danger">Not a match</button>
  </p>
</form>"#,
    id = esc(candidate_id),
  )
}

/// Shown when no pending candidate is left for this session.
pub fn caught_up(skipped: usize) -> String {
  let note = if skipped > 0 {
    format!(r#"<p class="muted">{skipped} skipped this session.</p>"#)
  } else {
    String::new()
  };
  format!(
    r#"<div class="notice notice-success">All caught up! No pending candidates to review.</div>
{note}<p>{}</p>"#,
    action_button("navigate", &[("view", "dashboard")], "Back to dashboard", "")
  )
}
