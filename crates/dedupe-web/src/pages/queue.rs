//! Pending candidate lists: the priority work queue and the filterable
//! review-matches list.

use dedupe_core::candidate::{CandidateFilter, CandidateSummary, PendingSort, Priority};

use super::{action_button, esc, or_dash, priority_badge, score_badge, select, text_input};

const SORTS: &[(&str, &str)] = &[("match_score", "Match score"), ("created_date", "Newest")];
const PRIORITIES: &[(&str, &str)] = &[("HIGH", "High"), ("MEDIUM", "Medium"), ("LOW", "Low")];

/// Candidate rows with an "Open" button each. `with_status` adds the status
/// and assigned agent columns used by the cluster browser.
pub fn candidate_table(rows: &[CandidateSummary], with_status: bool) -> String {
  if rows.is_empty() {
    return r#"<p class="muted">No candidates match.</p>"#.to_owned();
  }
  let extra_head = if with_status { "<th>Status</th><th>Reviewed by</th>" } else { "" };
  let body: String = rows
    .iter()
    .map(|c| {
      let extra = if with_status {
        format!(
          "<td>{}</td><td>{}</td>",
          super::status_badge(c.status),
          or_dash(c.assigned_to.as_deref())
        )
      } else {
        String::new()
      };
      format!(
        "<tr><td>{id}</td><td>{n1}<br><span class=\"muted\">{c1}</span></td>\
         <td>{n2}<br><span class=\"muted\">{c2}</span></td><td>{country}</td>\
         <td>{score}</td><td>{priority}</td><td>{reason}</td>{extra}<td>{open}</td></tr>",
        id = esc(&c.candidate_id),
        n1 = or_dash(Some(c.name_1.as_str())),
        c1 = esc(&c.customer_id_1),
        n2 = or_dash(Some(c.name_2.as_str())),
        c2 = esc(&c.customer_id_2),
        country = esc(&c.country),
        score = score_badge(c.match_score),
        priority = priority_badge(c.priority),
        reason = or_dash(c.match_reason.as_deref()),
        open = action_button("open", &[("candidate_id", c.candidate_id.as_str())], "Open", "primary"),
      )
    })
    .collect();
  format!(
    "<table><tr><th>Candidate</th><th>Customer 1</th><th>Customer 2</th><th>Country</th>\
     <th>Score</th><th>Priority</th><th>Reason</th>{extra_head}<th></th></tr>{body}</table>"
  )
}

/// Work queue: pending candidates, optionally narrowed to one priority.
pub fn work_queue(rows: &[CandidateSummary], priority: Option<Priority>, sort: PendingSort) -> String {
  format!(
    r#"<form method="get" action="/" class="filters">
  <label>Priority {priority}</label>
  <label>Sort {sort}</label>
  <button type="submit">Apply</button>
</form>
<p class="muted">{count} pending</p>
{table}"#,
    priority = select("priority", PRIORITIES, priority.as_ref().map(AsRef::as_ref)),
    sort = select("sort", SORTS, Some(sort.as_ref())),
    count = rows.len(),
    table = candidate_table(rows, false),
  )
}

/// Review matches: pending candidates with free-text filters.
pub fn review_matches(rows: &[CandidateSummary], filter: &CandidateFilter, sort: PendingSort) -> String {
  format!(
    r#"<form method="get" action="/" class="filters">
  {cluster}{customer}{country}
  <label>Sort {sort}</label>
  <button type="submit">Filter</button>
</form>
<p class="muted">{count} pending matches</p>
{table}"#,
    cluster = text_input("cluster_id", "Cluster", filter.cluster_id.as_deref()),
    customer = text_input("customer", "Customer", filter.customer.as_deref()),
    country = text_input("country", "Country", filter.country.as_deref()),
    sort = select("sort", SORTS, Some(sort.as_ref())),
    count = rows.len(),
    table = candidate_table(rows, false),
  )
}
