//! # Insight Synthesis
//!
//! Renders the briefing prompt for a brand and asks the language model for the
//! report. No retries happen here; a provider error is returned as is and the
//! orchestrator reports it as a synthesis failure.

use crate::{
    errors::InsightError, prompts::render_insight_prompt, providers::ai::AiProvider,
    types::GenerateOptions,
};
use tracing::{debug, info};

pub async fn synthesize(
    provider: &dyn AiProvider,
    context: &str,
    brand_name: &str,
    brand_description: &str,
    options: &GenerateOptions,
) -> Result<String, InsightError> {
    let prompt = render_insight_prompt(context, brand_name, brand_description)?;
    debug!(prompt = %prompt, model = %options.model, "--> Sending briefing prompt to AI Provider");

    let insights = provider.generate(&prompt, options).await?;

    info!(
        brand = %brand_name,
        model = %options.model,
        chars = insights.chars().count(),
        "Insight synthesis completed"
    );
    Ok(insights)
}
