use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::rubric::catalog::CriterionCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; per-request credentials never live here.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<CriterionCatalog>,
    /// Pluggable completion backend. Default: `LlmClient` against the configured endpoint.
    pub completion: Arc<dyn CompletionClient>,
}
