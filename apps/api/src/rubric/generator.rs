//! Rubric Generation — orchestrates the single-shot pipeline.
//!
//! Flow: resolve settings → validate params → build prompt → completion call →
//!       parse table → return response.
//!
//! A parse failure does not fail the request: the raw completion is returned
//! with `table: None` so the caller can show it as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{
    CompletionClient, CompletionSettings, Model, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use crate::rubric::catalog::CriterionCatalog;
use crate::rubric::prompts::build_rubric_prompt;
use crate::rubric::request::{RubricParams, RubricRequest};
use crate::rubric::table_parser::{parse_markdown_table, BlankCellPolicy, RubricTable};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Completion parameters as they arrive in a request body. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionParams {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Request body for rubric generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub rubric: RubricParams,
    #[serde(flatten)]
    pub completion: CompletionParams,
}

/// Response from the generation pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub rubric_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model: Model,
    pub prompt_chars: usize,
    /// Raw completion text, always present.
    pub markdown: String,
    /// `None` when the completion did not contain a usable table.
    pub table: Option<RubricTable>,
    pub parse_error: Option<String>,
    /// The table parsed but its header row is not `Criteria` + the requested levels.
    pub header_mismatch: bool,
    /// Requested criteria that no row of the table names.
    pub missing_criteria: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Builds per-request completion settings.
///
/// The key comes from the request, falling back to `default_api_key`.
/// Fails with `MissingCredential` before anything else is checked.
pub fn resolve_settings(
    params: &CompletionParams,
    default_api_key: Option<&str>,
) -> Result<CompletionSettings, AppError> {
    let api_key = params
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or(default_api_key)
        .ok_or(AppError::MissingCredential)?;

    let model = match params.model.as_deref() {
        Some(id) => id.parse::<Model>()?,
        None => Model::default(),
    };

    Ok(CompletionSettings::new(
        api_key.to_string(),
        model,
        params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    )?)
}

/// Runs the full generation pipeline for one request.
pub async fn generate_rubric(
    client: &dyn CompletionClient,
    catalog: &CriterionCatalog,
    policy: BlankCellPolicy,
    default_api_key: Option<&str>,
    request: GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let settings = resolve_settings(&request.completion, default_api_key)?;
    let rubric = RubricRequest::validate(request.rubric, catalog)?;

    let prompt = build_rubric_prompt(&rubric);
    info!(
        "Generating rubric: model={}, criteria={}, levels={}",
        settings.model,
        rubric.criteria().len(),
        rubric.performance_levels().len()
    );

    let markdown = client.complete(&settings, &prompt).await?;

    let (table, parse_error) = match parse_markdown_table(&markdown, policy) {
        Ok(table) => {
            info!("Parsed rubric table with {} rows", table.rows().len());
            (Some(table), None)
        }
        Err(e) => {
            warn!("Could not parse generated rubric: {e}");
            (None, Some(e.to_string()))
        }
    };

    let header_mismatch = table
        .as_ref()
        .is_some_and(|t| !t.matches_levels(rubric.performance_levels()));
    if let (true, Some(t)) = (header_mismatch, &table) {
        warn!("Generated table headers differ from requested levels: {:?}", t.headers());
    }
    let missing_criteria = table
        .as_ref()
        .map(|t| missing_criteria(t, rubric.criteria()))
        .unwrap_or_default();
    if !missing_criteria.is_empty() {
        warn!("Generated table has no row for {:?}", missing_criteria);
    }

    Ok(GenerateResponse {
        rubric_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        model: settings.model,
        prompt_chars: prompt.chars().count(),
        markdown,
        table,
        parse_error,
        header_mismatch,
        missing_criteria,
    })
}

/// Criteria with no row whose first cell mentions them.
/// Models often decorate names (`**Integrity (C)**`), so this is a substring match.
fn missing_criteria(table: &RubricTable, requested: &[String]) -> Vec<String> {
    let first_column = &table.headers()[0];
    requested
        .iter()
        .filter(|name| {
            !(0..table.rows().len()).any(|row| {
                table
                    .get(row, first_column)
                    .is_some_and(|cell| cell.contains(name.as_str()))
            })
        })
        .cloned()
        .collect()
}
