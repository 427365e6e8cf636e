//! HTTP routes: HTML pages, form handlers and the small JSON API

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::NaiveDate;
use engine::{build_leaderboard, Leaderboard, RankingSpec, ScoreFormat, ScoreInput};
use persistence::repository::{
    CompetitionRecord, CompetitionRepository, LeaderboardRuleRecord, NewCompetition,
    NewSubmission, RuleRepository, SubmissionRepository,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::flash::{self, FlashMessage};
use crate::{views, AppState, APP_VERSION};

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/leaderboard/:competition_id", get(api_leaderboard))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(index))
        .route(
            "/create_competition",
            get(create_competition_page).post(create_competition),
        )
        .route("/leaderboard/:competition_id", get(leaderboard_page))
        .route(
            "/submit_score/:competition_id",
            get(submit_score_page).post(submit_score),
        )
        .route(
            "/competition/:competition_id/manage_rules",
            get(manage_rules_page).post(add_rule),
        )
        .route("/rule/:rule_id/edit", get(edit_rule_page).post(edit_rule))
        .route("/rule/:rule_id/delete", post(delete_rule))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Helpers
// ============================================================================

/// Render a page, consuming any pending flash message
fn render(state: &AppState, headers: &HeaderMap, title: &str, body: &str) -> Response {
    let flash = flash::from_headers(headers, &state.secret);
    let html = Html(views::layout(title, flash.as_ref(), body));
    if flash.is_some() {
        ([(header::SET_COOKIE, flash::clear_cookie())], html).into_response()
    } else {
        html.into_response()
    }
}

/// Redirect to `to`, carrying a flash message for the next page
fn redirect_with_flash(state: &AppState, to: &str, flash: FlashMessage) -> Response {
    match flash::set_cookie(&state.secret, &flash) {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], Redirect::to(to)).into_response(),
        None => Redirect::to(to).into_response(),
    }
}

/// Trimmed, non-empty form value
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

async fn load_competition(state: &AppState, id: i64) -> AppResult<CompetitionRecord> {
    CompetitionRepository::new(state.db.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("competition {id}")))
}

async fn load_rule(state: &AppState, id: i64) -> AppResult<LeaderboardRuleRecord> {
    RuleRepository::new(state.db.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("rule {id}")))
}

fn score_format_of(competition: &CompetitionRecord) -> AppResult<ScoreFormat> {
    competition
        .score_format
        .parse()
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))
}

fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("{field} must be YYYY-MM-DD, got '{value}'")))
}

/// Validate rule form fields into (name, canonical ranking).
/// Both fields are required; the ranking must parse.
fn validate_rule_form(form: &RuleForm) -> Result<(String, String), String> {
    let (Some(name), Some(ranking)) = (non_empty(&form.name), non_empty(&form.sql_query)) else {
        return Err("Rule name and ranking are both required".to_string());
    };
    let spec: RankingSpec = ranking
        .parse()
        .map_err(|e| format!("Invalid ranking: {e}"))?;
    Ok((name.to_string(), spec.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    rule: Option<i64>,
}

/// Competition, its rules, and the leaderboard (ordered by `rule_id` if given)
async fn assemble_leaderboard(
    state: &AppState,
    competition_id: i64,
    rule_id: Option<i64>,
) -> AppResult<(CompetitionRecord, Vec<LeaderboardRuleRecord>, Leaderboard)> {
    let competition = load_competition(state, competition_id).await?;
    let format = score_format_of(&competition)?;

    let rules = RuleRepository::new(state.db.pool())
        .list_for_competition(competition_id)
        .await?;

    let spec = match rule_id {
        Some(rule_id) => {
            let rule = rules
                .iter()
                .find(|r| r.id == rule_id)
                .ok_or_else(|| AppError::NotFound(format!("rule {rule_id} for competition {competition_id}")))?;
            let spec: RankingSpec = rule
                .ranking
                .parse()
                .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
            Some(spec)
        }
        None => None,
    };

    let submissions = SubmissionRepository::new(state.db.pool())
        .list_for_competition(competition_id)
        .await?;
    let board = build_leaderboard(competition_id, format, submissions, spec.as_ref());

    Ok((competition, rules, board))
}

// ============================================================================
// Competitions
// ============================================================================

/// GET /
async fn index(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let competitions = CompetitionRepository::new(state.db.pool()).list().await?;
    Ok(render(&state, &headers, "Competitions", &views::index(&competitions)))
}

/// GET /create_competition
async fn create_competition_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    render(
        &state,
        &headers,
        "New competition",
        &views::create_competition_form(),
    )
}

#[derive(Debug, Deserialize)]
pub struct CreateCompetitionForm {
    title: Option<String>,
    description: Option<String>,
    score_format: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    status: Option<String>,
}

/// POST /create_competition
async fn create_competition(
    State(state): State<AppState>,
    Form(form): Form<CreateCompetitionForm>,
) -> AppResult<Response> {
    const BACK: &str = "/create_competition";

    let (Some(title), Some(score_format), Some(start_raw), Some(end_raw)) = (
        non_empty(&form.title),
        non_empty(&form.score_format),
        non_empty(&form.start_date),
        non_empty(&form.end_date),
    ) else {
        return Ok(redirect_with_flash(
            &state,
            BACK,
            FlashMessage::error("Title, score format, start date and end date are required"),
        ));
    };

    let score_format: ScoreFormat = match score_format.parse() {
        Ok(format) => format,
        Err(e) => return Ok(redirect_with_flash(&state, BACK, FlashMessage::error(e.to_string()))),
    };

    let start_date = parse_date("start_date", start_raw)?;
    let end_date = parse_date("end_date", end_raw)?;
    if end_date < start_date {
        return Ok(redirect_with_flash(
            &state,
            BACK,
            FlashMessage::error("End date must not be before start date"),
        ));
    }

    let new = NewCompetition {
        title: title.to_string(),
        description: non_empty(&form.description).map(str::to_string),
        status: non_empty(&form.status).unwrap_or("ongoing").to_string(),
        start_date: start_date.format("%Y-%m-%d").to_string(),
        end_date: end_date.format("%Y-%m-%d").to_string(),
        score_format: score_format.as_str().to_string(),
    };
    let id = CompetitionRepository::new(state.db.pool()).create(&new).await?;
    info!(competition_id = id, title = %new.title, score_format = %score_format, "Competition created");

    Ok(redirect_with_flash(
        &state,
        "/",
        FlashMessage::success(format!("Competition \"{}\" created", new.title)),
    ))
}

// ============================================================================
// Submissions & leaderboard
// ============================================================================

/// GET /leaderboard/:competition_id
async fn leaderboard_page(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    Query(query): Query<LeaderboardQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let (competition, rules, board) =
        assemble_leaderboard(&state, competition_id, query.rule).await?;
    let body = views::leaderboard(&competition, &rules, &board, query.rule);
    Ok(render(&state, &headers, &competition.title, &body))
}

/// GET /submit_score/:competition_id
async fn submit_score_page(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let competition = load_competition(&state, competition_id).await?;
    let title = format!("Submit score · {}", competition.title);
    Ok(render(&state, &headers, &title, &views::submit_score_form(&competition)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitScoreForm {
    participant_name: Option<String>,
    hours: Option<String>,
    minutes: Option<String>,
    seconds: Option<String>,
    number_score: Option<String>,
}

/// POST /submit_score/:competition_id
async fn submit_score(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    Form(form): Form<SubmitScoreForm>,
) -> AppResult<Response> {
    let competition = load_competition(&state, competition_id).await?;
    let format = score_format_of(&competition)?;

    let participant_name = non_empty(&form.participant_name)
        .ok_or_else(|| AppError::InvalidInput("participant_name is required".to_string()))?;

    let input = ScoreInput::from_fields(
        format,
        form.hours.as_deref(),
        form.minutes.as_deref(),
        form.seconds.as_deref(),
        form.number_score.as_deref(),
    )
    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    let score = input.normalize();

    let id = SubmissionRepository::new(state.db.pool())
        .create(&NewSubmission {
            competition_id,
            participant_name: participant_name.to_string(),
            score,
            score_format: format.as_str().to_string(),
        })
        .await?;
    info!(competition_id, submission_id = id, score, "Score submitted");

    Ok(redirect_with_flash(
        &state,
        &format!("/leaderboard/{competition_id}"),
        FlashMessage::success(format!("Score recorded for {participant_name}")),
    ))
}

// ============================================================================
// Rules
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RuleForm {
    name: Option<String>,
    #[serde(alias = "ranking")]
    sql_query: Option<String>,
}

/// GET /competition/:competition_id/manage_rules
async fn manage_rules_page(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let competition = load_competition(&state, competition_id).await?;
    let rules = RuleRepository::new(state.db.pool())
        .list_for_competition(competition_id)
        .await?;
    let title = format!("Rules · {}", competition.title);
    Ok(render(&state, &headers, &title, &views::manage_rules(&competition, &rules)))
}

/// POST /competition/:competition_id/manage_rules
async fn add_rule(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    Form(form): Form<RuleForm>,
) -> AppResult<Response> {
    load_competition(&state, competition_id).await?;
    let back = format!("/competition/{competition_id}/manage_rules");

    let (name, ranking) = match validate_rule_form(&form) {
        Ok(valid) => valid,
        Err(message) => {
            debug!(competition_id, %message, "Rejected rule");
            return Ok(redirect_with_flash(&state, &back, FlashMessage::error(message)));
        }
    };

    let id = RuleRepository::new(state.db.pool())
        .create(competition_id, &name, &ranking)
        .await?;
    info!(competition_id, rule_id = id, %ranking, "Rule added");

    Ok(redirect_with_flash(
        &state,
        &back,
        FlashMessage::success(format!("Rule \"{name}\" added")),
    ))
}

/// GET /rule/:rule_id/edit
async fn edit_rule_page(
    State(state): State<AppState>,
    Path(rule_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let rule = load_rule(&state, rule_id).await?;
    let competition = load_competition(&state, rule.competition_id).await?;
    let title = format!("Edit rule · {}", rule.name);
    Ok(render(&state, &headers, &title, &views::edit_rule(&competition, &rule)))
}

/// POST /rule/:rule_id/edit
async fn edit_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<i64>,
    Form(form): Form<RuleForm>,
) -> AppResult<Response> {
    let rule = load_rule(&state, rule_id).await?;

    let (name, ranking) = match validate_rule_form(&form) {
        Ok(valid) => valid,
        Err(message) => {
            debug!(rule_id, %message, "Rejected rule edit");
            return Ok(redirect_with_flash(
                &state,
                &format!("/rule/{rule_id}/edit"),
                FlashMessage::error(message),
            ));
        }
    };

    if !RuleRepository::new(state.db.pool())
        .update(rule_id, &name, &ranking)
        .await?
    {
        return Err(AppError::NotFound(format!("rule {rule_id}")));
    }
    info!(rule_id, %ranking, "Rule updated");

    Ok(redirect_with_flash(
        &state,
        &format!("/competition/{}/manage_rules", rule.competition_id),
        FlashMessage::success(format!("Rule \"{name}\" updated")),
    ))
}

/// POST /rule/:rule_id/delete
async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<i64>,
) -> AppResult<Response> {
    let rule = load_rule(&state, rule_id).await?;

    if !RuleRepository::new(state.db.pool()).delete(rule_id).await? {
        return Err(AppError::NotFound(format!("rule {rule_id}")));
    }
    info!(rule_id, competition_id = rule.competition_id, "Rule deleted");

    Ok(redirect_with_flash(
        &state,
        &format!("/competition/{}/manage_rules", rule.competition_id),
        FlashMessage::success(format!("Rule \"{}\" deleted", rule.name)),
    ))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "competition-board",
        "version": APP_VERSION,
    }))
}

/// GET /api/leaderboard/:competition_id — leaderboard as JSON
async fn api_leaderboard(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    Query(query): Query<LeaderboardQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    match assemble_leaderboard(&state, competition_id, query.rule).await {
        Ok((competition, _, board)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "competition": competition,
                "leaderboard": board,
            })),
        ),
        Err(e) => (
            e.status_code(),
            Json(serde_json::json!({
                "success": false,
                "error": e.public_message(),
            })),
        ),
    }
}
