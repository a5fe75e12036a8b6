// Tenet - Constitutional critique and revision engine
// Library exports

// Core modules
pub mod constitution;
pub mod critique;
pub mod engine;
pub mod providers;

// CLI surface
pub mod cli;
pub mod config;

// Re-export the types most callers need
pub use constitution::{Constitution, Principle, PrincipleCategory};
pub use critique::{CritiqueEvent, CritiqueResult, LoopOptions};
pub use engine::CritiqueEngine;
pub use providers::{ClaudeGenerator, TextGenerator};
