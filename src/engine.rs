// Critique engine service
//
// One engine is constructed at process start around a shared generator and
// passed by handle to whatever consumes it (CLI today, a request handler
// tomorrow). There is no lazily-initialized global.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::constitution::Constitution;
use crate::critique::{
    compare_constitutions, run_critique, run_full_pipeline, stream_full_pipeline, CritiqueEvent,
    CritiqueResult, LoopOptions,
};
use crate::providers::TextGenerator;

/// Service handle for running critique operations against one shared
/// generator.
#[derive(Clone)]
pub struct CritiqueEngine {
    generator: Arc<dyn TextGenerator>,
    default_model: String,
}

impl CritiqueEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        let default_model = generator.default_model().to_string();
        Self {
            generator,
            default_model,
        }
    }

    /// Override the model used when callers pass `None`.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn model<'a>(&'a self, model: Option<&'a str>) -> &'a str {
        model.unwrap_or(&self.default_model)
    }

    /// Run the critique loop on an existing response.
    pub async fn critique(
        &self,
        prompt: &str,
        response: &str,
        constitution: &Constitution,
        model: Option<&str>,
        options: &LoopOptions,
    ) -> CritiqueResult {
        tracing::info!(
            constitution = %constitution.id,
            principles = constitution.enabled_principles().len(),
            "Running critique loop"
        );
        run_critique(
            prompt,
            response,
            constitution,
            self.generator.as_ref(),
            self.model(model),
            options,
        )
        .await
    }

    /// Generate a fresh response, then critique it.
    pub async fn full_pipeline(
        &self,
        prompt: &str,
        constitution: &Constitution,
        model: Option<&str>,
        options: &LoopOptions,
    ) -> Result<CritiqueResult> {
        run_full_pipeline(
            prompt,
            constitution,
            self.generator.as_ref(),
            self.model(model),
            options,
        )
        .await
        .context("Pipeline failed")
    }

    /// Compare several constitutions against one shared initial response.
    pub async fn compare(
        &self,
        prompt: &str,
        constitutions: &[Constitution],
        model: Option<&str>,
        options: &LoopOptions,
    ) -> Result<Vec<CritiqueResult>> {
        compare_constitutions(
            prompt,
            constitutions,
            self.generator.as_ref(),
            self.model(model),
            options,
        )
        .await
    }

    /// Run the full pipeline, streaming progress events.
    pub fn stream_pipeline(
        &self,
        prompt: &str,
        constitution: Constitution,
        model: Option<&str>,
        options: LoopOptions,
    ) -> mpsc::Receiver<CritiqueEvent> {
        stream_full_pipeline(
            prompt.to_string(),
            constitution,
            Arc::clone(&self.generator),
            self.model(model).to_string(),
            options,
        )
    }
}
