//! Server-rendered HTML.
//!
//! Every page is a plain `String` assembled with `format!`. Dynamic text goes
//! through [`esc`] before it reaches the markup; nothing else is escaped.

pub mod admin;
pub mod clusters;
pub mod dashboard;
pub mod history;
pub mod queue;
pub mod review;

use std::borrow::Cow;

use axum::{http::header, response::IntoResponse};
use dedupe_core::{
  candidate::{CandidateStatus, Priority, ScoreTier},
  view::{Notice, View},
};
use strum::IntoEnumIterator as _;

pub const STYLESHEET: &str = include_str!("app.css");

/// `GET /static/app.css`
pub async fn stylesheet() -> impl IntoResponse {
  ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

pub fn esc(s: &str) -> Cow<'_, str> { quick_xml::escape::escape(s) }

/// Escaped value or an em dash placeholder for missing data.
pub fn or_dash(s: Option<&str>) -> Cow<'_, str> {
  match s.map(str::trim).filter(|s| !s.is_empty()) {
    Some(s) => esc(s),
    None => Cow::Borrowed("&#8212;"),
  }
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// What the surrounding page needs from the session.
pub struct Chrome<'a> {
  pub agent_name: &'a str,
  pub view:       View,
  pub notice:     Option<&'a Notice>,
}

pub fn layout(chrome: &Chrome<'_>, body: &str) -> String {
  let notice = chrome.notice.map(notice_banner).unwrap_or_default();
  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Duplicate Review</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<header>
  <h1>Customer Duplicate Review</h1>
  <form method="post" action="/action" class="agent">
    <input type="hidden" name="action" value="set_agent">
    <label>Agent <input type="text" name="agent_name" value="{agent}" required></label>
    <button type="submit">Save</button>
  </form>
</header>
<nav>{nav}</nav>
<main>
{notice}
<h2>{title}</h2>
{body}
</main>
</body>
</html>
"#,
    title = esc(chrome.view.title()),
    agent = esc(chrome.agent_name),
    nav = nav(chrome.view),
  )
}

fn nav(current: View) -> String {
  View::iter()
    .map(|view| {
      let class = if view == current { "nav active" } else { "nav" };
      action_button("navigate", &[("view", view.as_ref())], view.title(), class)
    })
    .collect()
}

pub fn notice_banner(notice: &Notice) -> String {
  format!(
    r#"<div class="notice notice-{}">{}</div>"#,
    notice.level.as_ref(),
    esc(&notice.message)
  )
}

/// Inline banner for a query that failed while rendering a list.
pub fn error_banner(message: &str) -> String {
  format!(r#"<div class="notice notice-error">{}</div>"#, esc(message))
}

// ─── Widgets ─────────────────────────────────────────────────────────────────

/// A one-button form posting `action` (plus hidden `fields`) to `/action`.
pub fn action_button(action: &str, fields: &[(&str, &str)], label: &str, class: &str) -> String {
  let hidden: String = fields
    .iter()
    .map(|(name, value)| {
      format!(r#"<input type="hidden" name="{}" value="{}">"#, esc(name), esc(value))
    })
    .collect();
  format!(
    r#"<form method="post" action="/action" class="inline"><input type="hidden" name="action" value="{}">{hidden}<button type="submit" class="{}">{}</button></form>"#,
    esc(action),
    esc(class),
    esc(label),
  )
}

pub fn score_badge(score: f64) -> String {
  let tier = ScoreTier::from_score(score);
  format!(r#"<span class="score score-{tier}">{score:.1}%</span>"#)
}

pub fn priority_badge(priority: Priority) -> String {
  format!(
    r#"<span class="priority priority-{}">{priority}</span>"#,
    priority.as_ref().to_ascii_lowercase()
  )
}

pub fn status_badge(status: CandidateStatus) -> String {
  let label = match status {
    CandidateStatus::Pending => "Pending",
    CandidateStatus::Matched => "Confirmed",
    CandidateStatus::NotMatched => "Not a match",
  };
  format!(
    r#"<span class="status status-{}">{label}</span>"#,
    status.as_ref().to_ascii_lowercase()
  )
}

/// A `<select>` whose first option is "any".
pub fn select(name: &str, options: &[(&str, &str)], selected: Option<&str>) -> String {
  let opts: String = options
    .iter()
    .map(|(value, label)| {
      let sel = if Some(*value) == selected { " selected" } else { "" };
      format!(r#"<option value="{}"{sel}>{}</option>"#, esc(value), esc(label))
    })
    .collect();
  format!(r#"<select name="{}"><option value="">All</option>{opts}</select>"#, esc(name))
}

/// A labelled text input pre-filled with the current filter value.
pub fn text_input(name: &str, label: &str, value: Option<&str>) -> String {
  format!(
    r#"<label>{} <input type="text" name="{}" value="{}"></label>"#,
    esc(label),
    esc(name),
    esc(value.unwrap_or_default())
  )
}
