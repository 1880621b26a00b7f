use std::sync::Arc;

use crate::pipeline::RequestPipeline;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,

    /// Expected API-key secret. `None` fails every compare request closed.
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(pipeline: Arc<RequestPipeline>, api_key: Option<String>) -> Self {
        Self { pipeline, api_key }
    }
}
