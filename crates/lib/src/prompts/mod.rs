//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the `brandsight` library.

pub mod insight;

pub use insight::{render_insight_prompt, INSIGHT_BRIEFING_PROMPT};
