// Critique engine
//
// The self-critique and revision loop: evaluate a response against every
// enabled principle of a constitution, synthesize one revision per round,
// repeat until the text stops changing or the round budget runs out.

use serde::{Deserialize, Serialize};

pub mod compare;
pub mod evaluator;
pub mod reviser;
pub mod runner;
pub mod stream;
pub mod text;

pub use compare::compare_constitutions;
pub use evaluator::critique_principle;
pub use reviser::revise_response;
pub use runner::{run_critique, run_full_pipeline, LoopOptions};
pub use stream::{stream_full_pipeline, CritiqueEvent};
pub use text::{diff_summary, text_similarity};

/// Result of critiquing a response against a single principle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleCritique {
    pub principle_id: String,
    pub principle_name: String,
    pub triggered: bool,
    pub critique_text: String,
    /// 0.0 to 1.0
    pub severity: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A revised response with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub text: String,
    pub confidence: f64,
    #[serde(default)]
    pub changes_made: Vec<String>,
}

/// One complete round of critique and revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueRound {
    pub round_number: usize,
    pub input_response: String,
    /// One entry per enabled principle, in constitution order.
    pub critiques: Vec<PrincipleCritique>,
    pub revised_response: String,
    /// Names of triggered principles, in evaluation order.
    pub principles_triggered: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub diff_summary: String,
}

/// Complete result of one critique loop execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueResult {
    pub original: String,
    #[serde(rename = "final")]
    pub final_response: String,
    pub prompt: String,
    pub rounds: Vec<CritiqueRound>,
    pub total_rounds: usize,
    pub constitution_id: String,
    pub constitution_name: String,
    /// Derived as rounds-executed < max_rounds: a loop that stopped early
    /// on the similarity threshold converged, one that ran the full budget
    /// did not. A convergence on the very last allowed round is therefore
    /// indistinguishable from exhaustion.
    pub converged: bool,
    /// Union of every round's triggered principles; order not guaranteed.
    #[serde(default)]
    pub total_principles_triggered: Vec<String>,
    /// 1 - similarity(original, final): 0 = unchanged, higher = more
    /// rewritten.
    pub improvement_score: f64,
}
