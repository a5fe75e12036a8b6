// Critique loop orchestrator
//
// Round structure: evaluate every enabled principle concurrently, revise
// once, summarize the diff, then check convergence. The loop ends when a
// revision lands within the similarity threshold of its input or when the
// round budget is exhausted.

use anyhow::{Context, Result};
use futures::future::join_all;

use super::evaluator::critique_principle;
use super::reviser::revise_response;
use super::text::{diff_summary, text_similarity};
use super::{CritiqueResult, CritiqueRound, PrincipleCritique};
use crate::constitution::Constitution;
use crate::providers::{GenerationRequest, Message, TextGenerator};

pub const DEFAULT_MAX_ROUNDS: usize = 3;
pub const MAX_ROUNDS_LIMIT: usize = 5;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.98;

const INITIAL_RESPONSE_MAX_TOKENS: u32 = 2048;

/// Tunable knobs of the critique loop.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Number of rounds to run at most; clamped to [1, 5].
    pub max_rounds: usize,
    /// Similarity at or above which a round is considered converged.
    pub convergence_threshold: f64,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl LoopOptions {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    fn clamped_max_rounds(&self) -> usize {
        self.max_rounds.clamp(1, MAX_ROUNDS_LIMIT)
    }
}

/// Run the critique loop on an existing response.
///
/// Infallible by construction: evaluator and reviser contain their own
/// failures, so the worst case is a trace full of degraded rounds.
pub async fn run_critique(
    prompt: &str,
    initial_response: &str,
    constitution: &Constitution,
    generator: &dyn TextGenerator,
    model: &str,
    options: &LoopOptions,
) -> CritiqueResult {
    let max_rounds = options.clamped_max_rounds();
    let enabled = constitution.enabled_principles();

    let mut rounds: Vec<CritiqueRound> = Vec::new();
    let mut current = initial_response.to_string();
    // First-trigger order; the data model only promises set semantics.
    let mut all_triggered: Vec<String> = Vec::new();

    for round_number in 0..max_rounds {
        tracing::debug!(round = round_number, "Starting critique round");

        // Fan out one evaluation per enabled principle; join_all keeps the
        // results in constitution order no matter which call finishes
        // first.
        let critiques: Vec<PrincipleCritique> = join_all(
            enabled
                .iter()
                .map(|p| critique_principle(&current, p, prompt, generator, model)),
        )
        .await;

        let round_triggered: Vec<String> = critiques
            .iter()
            .filter(|c| c.triggered)
            .map(|c| c.principle_name.clone())
            .collect();
        for name in &round_triggered {
            if !all_triggered.contains(name) {
                all_triggered.push(name.clone());
            }
        }

        let revision = revise_response(&current, &critiques, prompt, generator, model).await;
        let summary = diff_summary(&current, &revision.text);

        rounds.push(CritiqueRound {
            round_number,
            input_response: current.clone(),
            critiques,
            revised_response: revision.text.clone(),
            principles_triggered: round_triggered,
            confidence: revision.confidence,
            diff_summary: summary,
        });

        let similarity = text_similarity(&current, &revision.text);
        if similarity >= options.convergence_threshold {
            // Converged: the revised text stays recorded on the round but
            // `current` keeps the pre-revision value.
            tracing::debug!(round = round_number, similarity, "Loop converged");
            break;
        }

        current = revision.text;
    }

    let improvement_score = 1.0 - text_similarity(initial_response, &current);
    let total_rounds = rounds.len();

    CritiqueResult {
        original: initial_response.to_string(),
        final_response: current,
        prompt: prompt.to_string(),
        rounds,
        total_rounds,
        constitution_id: constitution.id.clone(),
        constitution_name: constitution.name.clone(),
        converged: total_rounds < max_rounds,
        total_principles_triggered: all_triggered,
        improvement_score,
    }
}

/// Generate the initial response for the full pipeline.
///
/// Unlike every other generation call in the loop there is no fallback
/// here: without an initial response there is nothing to critique.
pub async fn generate_initial_response(
    prompt: &str,
    generator: &dyn TextGenerator,
    model: &str,
) -> Result<String> {
    let request = GenerationRequest::new(vec![Message::user(prompt)])
        .with_model(model)
        .with_max_tokens(INITIAL_RESPONSE_MAX_TOKENS);

    generator
        .generate(&request)
        .await
        .context("Failed to generate initial response")
}

/// Generate a fresh response to the prompt, then run the critique loop on
/// it.
pub async fn run_full_pipeline(
    prompt: &str,
    constitution: &Constitution,
    generator: &dyn TextGenerator,
    model: &str,
    options: &LoopOptions,
) -> Result<CritiqueResult> {
    let initial_response = generate_initial_response(prompt, generator, model).await?;
    Ok(run_critique(prompt, &initial_response, constitution, generator, model, options).await)
}
