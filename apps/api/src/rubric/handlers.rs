//! Axum route handlers for the Rubric API.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{
    Model, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, MAX_MAX_TOKENS, MAX_TEMPERATURE,
    MIN_MAX_TOKENS, MIN_TEMPERATURE,
};
use crate::rubric::catalog::CriterionGroup;
use crate::rubric::export::{to_csv, CSV_CONTENT_DISPOSITION, CSV_CONTENT_TYPE, CSV_FILE_NAME};
use crate::rubric::generator::{generate_rubric, GenerateRequest, GenerateResponse};
use crate::rubric::prompts::build_rubric_prompt;
use crate::rubric::request::{
    RubricParams, RubricRequest, MAX_LEARNING_OUTCOMES, MAX_PERFORMANCE_LEVELS,
    MIN_PERFORMANCE_LEVELS, PRESET_PERFORMANCE_LEVELS,
};
use crate::rubric::table_parser::{parse_markdown_table, BlankCellPolicy, RubricTable};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CriteriaResponse {
    pub categories: Vec<CriterionGroup>,
}

#[derive(Debug, Serialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    pub default: T,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub models: Vec<Model>,
    pub default_model: Model,
    pub temperature: Bounds<f32>,
    pub max_tokens: Bounds<u32>,
    pub preset_performance_levels: Vec<&'static str>,
    pub max_learning_outcomes: usize,
    pub performance_level_count: Bounds<usize>,
    pub blank_cells: BlankCellPolicy,
    pub export_file_name: &'static str,
    pub api_key_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkdownRequest {
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub table: RubricTable,
}

/// A table supplied by the client for export. Rows are normalised on the way in.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/criteria
pub async fn handle_list_criteria(State(state): State<AppState>) -> Json<CriteriaResponse> {
    Json(CriteriaResponse {
        categories: state.catalog.grouped(),
    })
}

/// GET /api/v1/settings
///
/// Everything a form needs to render its controls.
pub async fn handle_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        models: Model::ALL.to_vec(),
        default_model: Model::default(),
        temperature: Bounds {
            min: MIN_TEMPERATURE,
            max: MAX_TEMPERATURE,
            default: DEFAULT_TEMPERATURE,
        },
        max_tokens: Bounds {
            min: MIN_MAX_TOKENS,
            max: MAX_MAX_TOKENS,
            default: DEFAULT_MAX_TOKENS,
        },
        preset_performance_levels: PRESET_PERFORMANCE_LEVELS.to_vec(),
        max_learning_outcomes: MAX_LEARNING_OUTCOMES,
        performance_level_count: Bounds {
            min: MIN_PERFORMANCE_LEVELS,
            max: MAX_PERFORMANCE_LEVELS,
            default: PRESET_PERFORMANCE_LEVELS.len(),
        },
        blank_cells: state.config.blank_cells,
        export_file_name: CSV_FILE_NAME,
        api_key_configured: state.config.default_api_key.is_some(),
    })
}

/// POST /api/v1/rubrics/prompt
///
/// Renders the prompt without calling the model.
pub async fn handle_preview_prompt(
    State(state): State<AppState>,
    Json(params): Json<RubricParams>,
) -> Result<Json<PromptResponse>, AppError> {
    let request = RubricRequest::validate(params, &state.catalog)?;
    Ok(Json(PromptResponse {
        prompt: build_rubric_prompt(&request),
    }))
}

/// POST /api/v1/rubrics/generate
///
/// Full pipeline: validate → prompt → completion → parse.
/// An unparseable completion still returns 200 with `table: null`.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let response = generate_rubric(
        state.completion.as_ref(),
        &state.catalog,
        state.config.blank_cells,
        state.config.default_api_key.as_deref(),
        request,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/rubrics/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(request): Json<MarkdownRequest>,
) -> Result<Json<ParseResponse>, AppError> {
    let table = parse_markdown_table(&request.markdown, state.config.blank_cells)
        .map_err(|e| AppError::parse_failure(e, request.markdown.clone()))?;
    Ok(Json(ParseResponse { table }))
}

/// POST /api/v1/rubrics/export
///
/// Returns the table as a `rubric.csv` download.
pub async fn handle_export(
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let table = RubricTable::from_parts(request.headers, request.rows)
        .map_err(|e| AppError::Validation(format!("Cannot export table: {e}")))?;
    Ok(csv_download(&table))
}

/// POST /api/v1/rubrics/export/markdown
///
/// Parses completion text and returns it as CSV in one step.
pub async fn handle_export_markdown(
    State(state): State<AppState>,
    Json(request): Json<MarkdownRequest>,
) -> Result<impl IntoResponse, AppError> {
    let table = parse_markdown_table(&request.markdown, state.config.blank_cells)
        .map_err(|e| AppError::parse_failure(e, request.markdown.clone()))?;
    Ok(csv_download(&table))
}

fn csv_download(table: &RubricTable) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_CONTENT_DISPOSITION),
        ],
        to_csv(table),
    )
}
