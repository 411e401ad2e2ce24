//! Cluster browser: every candidate regardless of status.

use dedupe_core::candidate::{CandidateFilter, CandidateSummary};

use super::{queue::candidate_table, text_input};

pub fn render(rows: &[CandidateSummary], filter: &CandidateFilter) -> String {
  let confirmed = rows.iter().filter(|c| c.is_confirmed()).count();
  let reviewed = rows.iter().filter(|c| c.is_reviewed()).count();
  format!(
    r#"<form method="get" action="/" class="filters">
  {cluster}{customer}{country}{consultant}
  <button type="submit">Filter</button>
</form>
<div class="cards">
  <div class="card"><div class="value">{total}</div><div class="label">Clusters</div></div>
  <div class="card"><div class="value">{reviewed}</div><div class="label">Reviewed</div></div>
  <div class="card"><div class="value">{confirmed}</div><div class="label">Confirmed duplicates</div></div>
</div>
{table}"#,
    cluster = text_input("cluster_id", "Cluster", filter.cluster_id.as_deref()),
    customer = text_input("customer", "Customer", filter.customer.as_deref()),
    country = text_input("country", "Country", filter.country.as_deref()),
    consultant = text_input("consultant", "Consultant", filter.consultant.as_deref()),
    total = rows.len(),
    table = candidate_table(rows, true),
  )
}
