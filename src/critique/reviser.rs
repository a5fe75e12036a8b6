// Response reviser
//
// One generation call per round, handed every triggered critique, asking
// for the minimal rewrite that addresses them all. If nothing triggered,
// the original text is returned without a generation call. Revision
// failures degrade to the unrevised input with zero confidence.

use anyhow::Result;

use super::text::text_similarity;
use super::{PrincipleCritique, Revision};
use crate::providers::{GenerationRequest, Message, TextGenerator};

const REVISION_MAX_TOKENS: u32 = 2048;

/// Entry recorded on a revision when no principle triggered.
pub const NO_CHANGES_NEEDED: &str =
    "No changes needed - response already aligns with principles";

const REVISER_SYSTEM_PROMPT: &str = "\
You are a constitutional AI reviser. Your job is to revise an AI response
to better align with the given principles while maintaining helpfulness.

Important guidelines:
1. Make the minimum changes necessary to address the critiques
2. Preserve the helpful and accurate parts of the original
3. Don't over-correct or become unhelpfully restrictive
4. Maintain the same general tone and style

Respond with ONLY the revised response text, no explanations or metadata.";

/// Produce a single consolidated revision addressing all triggered
/// critiques.
///
/// Never fails: a generation error falls back to the original text with
/// confidence 0.0.
pub async fn revise_response(
    original_response: &str,
    critiques: &[PrincipleCritique],
    prompt: &str,
    generator: &dyn TextGenerator,
    model: &str,
) -> Revision {
    let triggered: Vec<&PrincipleCritique> = critiques.iter().filter(|c| c.triggered).collect();

    if triggered.is_empty() {
        return Revision {
            text: original_response.to_string(),
            confidence: 1.0,
            changes_made: vec![NO_CHANGES_NEEDED.to_string()],
        };
    }

    match try_revise(original_response, &triggered, prompt, generator, model).await {
        Ok(revision) => revision,
        Err(e) => {
            tracing::warn!(error = %e, "Revision failed, keeping original response");
            Revision {
                text: original_response.to_string(),
                confidence: 0.0,
                changes_made: vec![format!("Revision failed: {:#}", e)],
            }
        }
    }
}

async fn try_revise(
    original_response: &str,
    triggered: &[&PrincipleCritique],
    prompt: &str,
    generator: &dyn TextGenerator,
    model: &str,
) -> Result<Revision> {
    let critiques_text = triggered
        .iter()
        .map(|c| {
            format!(
                "Principle: {}\nCritique: {}\nSuggestions: {}",
                c.principle_name,
                c.critique_text,
                c.suggestions.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let instruction = format!(
        "Original user prompt: {prompt}\n\n\
         Original AI response:\n\"\"\"\n{original_response}\n\"\"\"\n\n\
         Critiques to address:\n{critiques_text}\n\n\
         Please provide a revised response that addresses these critiques \
         while remaining helpful.",
    );

    let request = GenerationRequest::new(vec![Message::user(instruction)])
        .with_system(REVISER_SYSTEM_PROMPT)
        .with_model(model)
        .with_max_tokens(REVISION_MAX_TOKENS);

    let revised_text = generator.generate(&request).await?.trim().to_string();

    // Confidence floor is 0.5, rising toward 1.0 the closer the revision
    // stays to its input.
    let similarity = text_similarity(original_response, &revised_text);
    let confidence = 0.5 + similarity * 0.5;

    let changes_made = triggered
        .iter()
        .map(|c| format!("Addressed {} violation", c.principle_name))
        .collect();

    Ok(Revision {
        text: revised_text,
        confidence,
        changes_made,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn critique(name: &str, triggered: bool) -> PrincipleCritique {
        PrincipleCritique {
            principle_id: name.to_lowercase(),
            principle_name: name.to_string(),
            triggered,
            critique_text: format!("{} critique", name),
            severity: if triggered { 0.7 } else { 0.0 },
            suggestions: vec!["do better".to_string()],
        }
    }

    struct CountingGenerator {
        calls: AtomicU32,
        output: String,
    }

    impl CountingGenerator {
        fn new(output: &str) -> Self {
            Self {
                calls: AtomicU32::new(0),
                output: output.to_string(),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn default_model(&self) -> &str {
            "counting-model"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            anyhow::bail!("model unavailable")
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn default_model(&self) -> &str {
            "failing-model"
        }
    }

    #[tokio::test]
    async fn test_no_triggered_critiques_short_circuits() {
        let generator = CountingGenerator::new("should never be used");
        let critiques = vec![critique("A", false), critique("B", false)];

        let revision =
            revise_response("original", &critiques, "prompt", &generator, "m").await;

        assert_eq!(revision.text, "original");
        assert_eq!(revision.confidence, 1.0);
        assert_eq!(revision.changes_made, vec![NO_CHANGES_NEEDED.to_string()]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_revision_confidence_tracks_similarity() {
        let generator = CountingGenerator::new("original with a tweak");
        let critiques = vec![critique("A", true)];

        let revision =
            revise_response("original", &critiques, "prompt", &generator, "m").await;

        assert_eq!(revision.text, "original with a tweak");
        let expected = 0.5 + text_similarity("original", "original with a tweak") * 0.5;
        assert!((revision.confidence - expected).abs() < 1e-12);
        assert_eq!(
            revision.changes_made,
            vec!["Addressed A violation".to_string()]
        );
    }

    #[tokio::test]
    async fn test_one_change_entry_per_triggered_principle() {
        let generator = CountingGenerator::new("revised");
        let critiques = vec![critique("A", true), critique("B", false), critique("C", true)];

        let revision =
            revise_response("original", &critiques, "prompt", &generator, "m").await;

        assert_eq!(
            revision.changes_made,
            vec![
                "Addressed A violation".to_string(),
                "Addressed C violation".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original_text() {
        let critiques = vec![critique("A", true)];

        let revision =
            revise_response("original", &critiques, "prompt", &FailingGenerator, "m").await;

        assert_eq!(revision.text, "original");
        assert_eq!(revision.confidence, 0.0);
        assert!(revision.changes_made[0].contains("Revision failed"));
    }
}
