use crate::analysis::analyzer::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Analysis pipeline holding the extraction and completion backends.
    pub analyzer: Analyzer,
    pub config: Config,
}
