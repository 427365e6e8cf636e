//! HTML rendering
//!
//! Pages are plain strings assembled with `format!`. Every user-supplied value
//! goes through `escape` before it is interpolated.

use axum::http::StatusCode;
use engine::{Leaderboard, RankingSpec, ScoreFormat};
use persistence::repository::{CompetitionRecord, LeaderboardRuleRecord};
use std::fmt::Write;

use crate::flash::FlashMessage;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_of(competition: &CompetitionRecord) -> Option<ScoreFormat> {
    competition.score_format.parse().ok()
}

pub fn layout(title: &str, flash: Option<&FlashMessage>, body: &str) -> String {
    let flash_html = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Competition Board</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<nav><a href="/">Competitions</a> · <a href="/create_competition">New competition</a></nav>
<main>
{flash_html}
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, None, &format!("<p>{}</p>", escape(message)))
}

// ============================================================================
// Competitions
// ============================================================================

pub fn index(competitions: &[CompetitionRecord]) -> String {
    if competitions.is_empty() {
        return r#"<p>No competitions yet. <a href="/create_competition">Create one</a>.</p>"#
            .to_string();
    }

    let mut rows = String::new();
    for c in competitions {
        let format = format_of(c).map(|f| f.label()).unwrap_or("?");
        let _ = write!(
            rows,
            r#"<tr>
<td><a href="/leaderboard/{id}">{title}</a></td>
<td>{description}</td>
<td>{status}</td>
<td>{start} → {end}</td>
<td>{format}</td>
<td><a href="/submit_score/{id}">Submit score</a> · <a href="/competition/{id}/manage_rules">Rules</a></td>
</tr>
"#,
            id = c.id,
            title = escape(&c.title),
            description = escape(c.description.as_deref().unwrap_or("")),
            status = escape(&c.status),
            start = escape(&c.start_date),
            end = escape(&c.end_date),
        );
    }

    format!(
        r#"<table>
<thead><tr><th>Title</th><th>Description</th><th>Status</th><th>Dates</th><th>Score</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    )
}

pub fn create_competition_form() -> String {
    r#"<form method="post" action="/create_competition">
<label>Title <input name="title" required></label>
<label>Description <textarea name="description"></textarea></label>
<label>Score format
<select name="score_format">
<option value="time">Time (h:mm:ss)</option>
<option value="count">Count</option>
</select>
</label>
<label>Start date <input type="date" name="start_date" required></label>
<label>End date <input type="date" name="end_date" required></label>
<button type="submit">Create</button>
</form>"#
        .to_string()
}

// ============================================================================
// Submissions & leaderboard
// ============================================================================

pub fn submit_score_form(competition: &CompetitionRecord) -> String {
    let score_fields = match format_of(competition) {
        Some(ScoreFormat::Time) => {
            r#"<fieldset><legend>Time</legend>
<label>Hours <input type="number" name="hours" value="0"></label>
<label>Minutes <input type="number" name="minutes" value="0"></label>
<label>Seconds <input type="number" name="seconds" value="0"></label>
</fieldset>"#
        }
        _ => r#"<label>Score <input type="number" name="number_score" required></label>"#,
    };

    format!(
        r#"<form method="post" action="/submit_score/{id}">
<label>Participant <input name="participant_name" required></label>
{score_fields}
<button type="submit">Submit</button>
</form>
<p><a href="/leaderboard/{id}">Back to leaderboard</a></p>"#,
        id = competition.id,
    )
}

pub fn leaderboard(
    competition: &CompetitionRecord,
    rules: &[LeaderboardRuleRecord],
    board: &Leaderboard,
    selected_rule: Option<i64>,
) -> String {
    let mut html = String::new();

    if let Some(description) = &competition.description {
        let _ = writeln!(html, "<p>{}</p>", escape(description));
    }

    let mut rule_links = format!(
        r#"<a href="/leaderboard/{}"{}>Submission order</a>"#,
        competition.id,
        if selected_rule.is_none() { r#" class="active""# } else { "" }
    );
    for rule in rules {
        let _ = write!(
            rule_links,
            r#" · <a href="/leaderboard/{}?rule={}"{}>{}</a>"#,
            competition.id,
            rule.id,
            if selected_rule == Some(rule.id) { r#" class="active""# } else { "" },
            escape(&rule.name)
        );
    }
    let _ = writeln!(html, r#"<p class="rules">Order by: {rule_links}</p>"#);

    if board.entries.is_empty() {
        html.push_str("<p>No submissions yet.</p>\n");
    } else {
        let mut rows = String::new();
        for entry in &board.entries {
            let _ = writeln!(
                rows,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.rank.map(|r| r.to_string()).unwrap_or_default(),
                escape(&entry.participant_name),
                escape(&entry.display_score),
            );
        }
        let _ = write!(
            html,
            r#"<table>
<thead><tr><th>#</th><th>Participant</th><th>Score</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
"#
        );
    }

    let _ = write!(
        html,
        r#"<p><a href="/submit_score/{id}">Submit a score</a> · <a href="/competition/{id}/manage_rules">Manage rules</a></p>"#,
        id = competition.id
    );
    html
}

// ============================================================================
// Rules
// ============================================================================

fn rule_form(action: &str, name: &str, ranking: &str, placeholder: &str, button: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Name <input name="name" value="{name}" required></label>
<label>Ranking <input name="sql_query" value="{ranking}" placeholder="{placeholder}" required></label>
<p class="hint">score asc|desc [, submitted_at|participant_name|id asc|desc]</p>
<button type="submit">{button}</button>
</form>"#,
        action = escape(action),
        name = escape(name),
        ranking = escape(ranking),
        placeholder = escape(placeholder),
    )
}

pub fn manage_rules(competition: &CompetitionRecord, rules: &[LeaderboardRuleRecord]) -> String {
    let mut html = String::new();

    if rules.is_empty() {
        html.push_str("<p>No rules yet.</p>\n");
    } else {
        html.push_str("<ul class=\"rules\">\n");
        for rule in rules {
            let _ = writeln!(
                html,
                r#"<li><strong>{name}</strong> <code>{ranking}</code>
<a href="/leaderboard/{cid}?rule={id}">View</a> · <a href="/rule/{id}/edit">Edit</a>
<form method="post" action="/rule/{id}/delete" class="inline"><button type="submit">Delete</button></form></li>"#,
                name = escape(&rule.name),
                ranking = escape(&rule.ranking),
                cid = competition.id,
                id = rule.id,
            );
        }
        html.push_str("</ul>\n");
    }

    let placeholder = format_of(competition)
        .map(|f| RankingSpec::default_for(f).to_string())
        .unwrap_or_default();
    html.push_str("<h2>Add rule</h2>\n");
    html.push_str(&rule_form(
        &format!("/competition/{}/manage_rules", competition.id),
        "",
        "",
        &placeholder,
        "Add rule",
    ));
    let _ = write!(
        html,
        r#"<p><a href="/leaderboard/{}">Back to leaderboard</a></p>"#,
        competition.id
    );
    html
}

pub fn edit_rule(competition: &CompetitionRecord, rule: &LeaderboardRuleRecord) -> String {
    let mut html = rule_form(
        &format!("/rule/{}/edit", rule.id),
        &rule.name,
        &rule.ranking,
        "",
        "Save",
    );
    let _ = write!(
        html,
        r#"<p><a href="/competition/{}/manage_rules">Back to rules for {}</a></p>"#,
        competition.id,
        escape(&competition.title)
    );
    html
}
