use std::sync::Arc;

use crate::refinement::Refine;
use crate::render::DocumentBuilder;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Read-only after startup; renders share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable refiner. Default: `TextRefiner` built from the Azure OpenAI config.
    pub refiner: Arc<dyn Refine>,
    pub builder: DocumentBuilder,
}
