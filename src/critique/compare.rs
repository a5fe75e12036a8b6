// Multi-constitution comparison
//
// Generate one shared initial response, then run an independent critique
// loop per constitution against it, all concurrently. Results come back in
// input order regardless of which loop finishes first.

use anyhow::{Context, Result};
use futures::future::join_all;

use super::runner::{generate_initial_response, run_critique, LoopOptions};
use super::CritiqueResult;
use crate::constitution::Constitution;
use crate::providers::TextGenerator;

/// Run the critique loop once per constitution against one shared initial
/// response.
///
/// Only the shared initial generation can fail; the per-constitution loops
/// contain their own failures.
pub async fn compare_constitutions(
    prompt: &str,
    constitutions: &[Constitution],
    generator: &dyn TextGenerator,
    model: &str,
    options: &LoopOptions,
) -> Result<Vec<CritiqueResult>> {
    let initial_response = generate_initial_response(prompt, generator, model)
        .await
        .context("Comparison failed")?;

    let results = join_all(constitutions.iter().map(|constitution| {
        run_critique(
            prompt,
            &initial_response,
            constitution,
            generator,
            model,
            options,
        )
    }))
    .await;

    Ok(results)
}
