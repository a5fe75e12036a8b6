// Streaming critique pipeline
//
// Same control flow as the batch loop, but progress is pushed over a
// channel as it happens: one event per phase transition, terminated by
// `complete` or `error`. Dropping the receiver stops the producer at its
// next send, so an abandoned stream issues no further generation calls
// beyond the one in flight.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;

use super::evaluator::critique_principle;
use super::reviser::revise_response;
use super::runner::{generate_initial_response, LoopOptions};
use super::text::{diff_summary, text_similarity};
use super::{CritiqueResult, CritiqueRound, PrincipleCritique};
use crate::constitution::Constitution;
use crate::providers::TextGenerator;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Diff summary recorded on a synthetic round where nothing triggered.
const NO_CHANGES_NEEDED_DIFF: &str = "No changes needed";

/// Progress events emitted by the streaming pipeline, in strict order:
/// `generating`, `generated`, then per round `critiquing`, `critiqued` and,
/// when something triggered, `revising`, `revised`; finally `complete` or
/// `error`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CritiqueEvent {
    Generating,
    Generated {
        response: String,
    },
    Critiquing {
        round: usize,
    },
    Critiqued {
        round: usize,
        critiques: Vec<PrincipleCritique>,
        principles_triggered: Vec<String>,
    },
    Revising {
        round: usize,
    },
    Revised {
        round: usize,
        revised_response: String,
    },
    Complete {
        result: CritiqueResult,
    },
    Error {
        error: String,
    },
}

/// Run the full pipeline, streaming one event per phase transition.
///
/// The producer runs on a spawned task; consume events from the returned
/// receiver until `complete` or `error`. Dropping the receiver early
/// cancels the rest of the run.
pub fn stream_full_pipeline(
    prompt: String,
    constitution: Constitution,
    generator: Arc<dyn TextGenerator>,
    model: String,
    options: LoopOptions,
) -> mpsc::Receiver<CritiqueEvent> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        produce_events(tx, prompt, constitution, generator, model, options).await;
    });

    rx
}

async fn produce_events(
    tx: mpsc::Sender<CritiqueEvent>,
    prompt: String,
    constitution: Constitution,
    generator: Arc<dyn TextGenerator>,
    model: String,
    options: LoopOptions,
) {
    if tx.send(CritiqueEvent::Generating).await.is_err() {
        return;
    }

    let initial_response = match generate_initial_response(&prompt, generator.as_ref(), &model).await
    {
        Ok(response) => response,
        Err(e) => {
            let _ = tx
                .send(CritiqueEvent::Error {
                    error: format!("{:#}", e),
                })
                .await;
            return;
        }
    };

    if tx
        .send(CritiqueEvent::Generated {
            response: initial_response.clone(),
        })
        .await
        .is_err()
    {
        return;
    }

    let max_rounds = options.max_rounds.clamp(1, super::runner::MAX_ROUNDS_LIMIT);
    let enabled = constitution.enabled_principles();

    let mut rounds: Vec<CritiqueRound> = Vec::new();
    let mut current = initial_response.clone();
    let mut all_triggered: Vec<String> = Vec::new();

    for round_number in 0..max_rounds {
        if tx
            .send(CritiqueEvent::Critiquing {
                round: round_number,
            })
            .await
            .is_err()
        {
            return;
        }

        let critiques: Vec<PrincipleCritique> = join_all(
            enabled
                .iter()
                .map(|p| critique_principle(&current, p, &prompt, generator.as_ref(), &model)),
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

        if tx
            .send(CritiqueEvent::Critiqued {
                round: round_number,
                critiques: critiques.clone(),
                principles_triggered: round_triggered.clone(),
            })
            .await
            .is_err()
        {
            return;
        }

        if round_triggered.is_empty() {
            // Nothing triggered: record a synthetic round and end as
            // convergence, with no revising/revised pair.
            rounds.push(CritiqueRound {
                round_number,
                input_response: current.clone(),
                critiques,
                revised_response: current.clone(),
                principles_triggered: round_triggered,
                confidence: 1.0,
                diff_summary: NO_CHANGES_NEEDED_DIFF.to_string(),
            });
            break;
        }

        if tx
            .send(CritiqueEvent::Revising {
                round: round_number,
            })
            .await
            .is_err()
        {
            return;
        }

        let revision =
            revise_response(&current, &critiques, &prompt, generator.as_ref(), &model).await;
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

        if tx
            .send(CritiqueEvent::Revised {
                round: round_number,
                revised_response: revision.text.clone(),
            })
            .await
            .is_err()
        {
            return;
        }

        let similarity = text_similarity(&current, &revision.text);
        if similarity >= options.convergence_threshold {
            break;
        }

        current = revision.text;
    }

    let improvement_score = 1.0 - text_similarity(&initial_response, &current);
    let total_rounds = rounds.len();

    let result = CritiqueResult {
        original: initial_response,
        final_response: current,
        prompt,
        rounds,
        total_rounds,
        constitution_id: constitution.id.clone(),
        constitution_name: constitution.name.clone(),
        converged: total_rounds < max_rounds,
        total_principles_triggered: all_triggered,
        improvement_score,
    };

    let _ = tx.send(CritiqueEvent::Complete { result }).await;
}
