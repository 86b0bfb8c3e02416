//! # Insight Pipeline Tests
//!
//! Drives `InsightPipeline` end to end against the scriptable providers from
//! `brandsight-test-utils` and an in-memory store, checking the lifecycle of the
//! persisted record as well as what each provider was asked to do.

mod common;

use brandsight::providers::db::InsightStore;
use brandsight::{
    GenerateOverrides, InsightError, InsightRequest, InsightStatus, PipelineConfig,
    PipelineStage, SearchFailurePolicy,
};
use brandsight_test_utils::{
    hit, memory_pipeline, recording_pipeline, to_strings, MockAiProvider,
    MockExtractionProvider, MockSearchProvider,
};
use common::setup_tracing;
use std::time::Duration;

const BRIEFING: &str = "# Market Intelligence Briefing\n\n## 1. Executive Summary\nAcmeCo leads.";

fn acme_request(prompts: &[&str]) -> InsightRequest {
    InsightRequest::new("user-1", to_strings(prompts), "AcmeCo", "maker of widgets")
}

#[tokio::test]
async fn test_create_insight_end_to_end() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results(
        "AcmeCo reviews",
        vec![
            hit("https://reviews.example.com/acme", "Acme review"),
            hit("https://blog.example.com/widgets", "Widget roundup"),
        ],
    );
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let insight = pipeline
        .create_insight(acme_request(&["AcmeCo reviews"]))
        .await?;

    assert_eq!(insight.status, InsightStatus::Completed);
    assert!(insight.success);
    assert!(insight.error.is_none());
    assert!(insight.completed_at.is_some());
    assert_eq!(insight.results.len(), 1);

    let result = &insight.results[0];
    assert_eq!(result.search_results.len(), 2);
    assert_eq!(result.content.len(), 2);
    assert!(result.content.iter().all(|c| c.success));
    assert!(result.insights.starts_with("# Market Intelligence Briefing"));
    assert_eq!(result.prompts, to_strings(&["AcmeCo reviews"]));

    // Extraction received the deduplicated URLs in order, in one batch.
    assert_eq!(
        extraction.get_calls(),
        vec![to_strings(&[
            "https://reviews.example.com/acme",
            "https://blog.example.com/widgets"
        ])]
    );

    // The prompt carries the brand and the extracted context.
    let ai_calls = ai.get_calls();
    assert_eq!(ai_calls.len(), 1);
    assert!(ai_calls[0].0.contains("- Brand Name: AcmeCo"));
    assert!(ai_calls[0].0.contains("Content of https://reviews.example.com/acme"));
    assert_eq!(ai_calls[0].1.model, "gemini-2.5-flash");

    // The stored record is the returned one.
    let stored = store.find_by_id(&insight.id).await?;
    assert_eq!(stored.as_ref(), Some(&insight));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_urls_across_prompts_are_extracted_once() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("A", vec![hit("x", "from A")]);
    search.add_results("B", vec![hit("x", "from B"), hit("y", "y")]);
    // "A" answers last, but still wins the duplicate.
    search.add_delay("A", Duration::from_millis(30));
    let extraction = MockExtractionProvider::with_context("ctx");
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, _store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let insight = pipeline.create_insight(acme_request(&["A", "B"])).await?;

    let result = &insight.results[0];
    assert_eq!(result.search_results, vec![hit("x", "from A"), hit("y", "y")]);
    assert_eq!(extraction.get_calls(), vec![to_strings(&["x", "y"])]);
    assert_eq!(result.context, "ctx");
    Ok(())
}

#[tokio::test]
async fn test_search_failure_short_circuits_and_marks_failed() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("ok", vec![hit("https://a.example.com", "a")]);
    search.add_error("broken", "rate limited");
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let err = pipeline
        .create_insight(acme_request(&["ok", "broken"]))
        .await
        .unwrap_err();

    let (stage, message, insight) = match err {
        InsightError::Pipeline {
            stage,
            message,
            insight,
        } => (stage, message, insight),
        other => panic!("expected a pipeline failure, got {other:?}"),
    };
    assert_eq!(stage, PipelineStage::Search);
    assert!(message.contains("rate limited"), "message was: {message}");
    assert_eq!(insight.status, InsightStatus::Failed);
    assert!(!insight.success);
    assert_eq!(insight.error.as_deref(), Some(message.as_str()));
    assert!(insight.results.is_empty());

    // No later stage ran.
    assert!(extraction.get_calls().is_empty());
    assert!(ai.get_calls().is_empty());

    let stored = store
        .find_by_id(&insight.id)
        .await?
        .expect("failed record is persisted");
    assert_eq!(stored.status, InsightStatus::Failed);
    assert_eq!(stored.error, insight.error);
    Ok(())
}

#[tokio::test]
async fn test_record_moves_through_processing_before_completing() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("p", vec![hit("https://a.example.com", "a")]);
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, store) = recording_pipeline(&search, &extraction, &ai)?;

    pipeline.create_insight(acme_request(&["p"])).await?;

    assert_eq!(
        store.updates(),
        vec![InsightStatus::Processing, InsightStatus::Completed]
    );
    Ok(())
}

#[tokio::test]
async fn test_record_moves_through_processing_before_failing() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_error("p", "rate limited");
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, store) = recording_pipeline(&search, &extraction, &ai)?;

    let err = pipeline.create_insight(acme_request(&["p"])).await.unwrap_err();

    assert!(matches!(err, InsightError::Pipeline { .. }));
    assert_eq!(
        store.updates(),
        vec![InsightStatus::Processing, InsightStatus::Failed]
    );
    Ok(())
}

#[tokio::test]
async fn test_record_is_processing_while_a_stage_runs() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("slow", vec![hit("https://a.example.com", "a")]);
    search.add_delay("slow", Duration::from_millis(300));
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let run = tokio::spawn(async move { pipeline.create_insight(acme_request(&["slow"])).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let in_flight = store.find_all().await?;
    assert_eq!(in_flight.len(), 1);
    assert_eq!(in_flight[0].status, InsightStatus::Processing);

    let insight = run.await??;
    assert_eq!(insight.status, InsightStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_stage_error_survives_a_failed_final_write() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("p", vec![hit("https://a.example.com", "a")]);
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::failing("model overloaded");
    let (pipeline, store) = recording_pipeline(&search, &extraction, &ai)?;
    store.fail_updates_to(InsightStatus::Failed);

    let err = pipeline.create_insight(acme_request(&["p"])).await.unwrap_err();

    match err {
        InsightError::Pipeline {
            stage,
            message,
            insight,
        } => {
            assert_eq!(stage, PipelineStage::Synthesis);
            assert!(message.contains("model overloaded"), "message was: {message}");
            assert_eq!(insight.status, InsightStatus::Failed);
        }
        other => panic!("expected a pipeline failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_synthesis_failure_is_reported_from_its_stage() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("p", vec![hit("https://a.example.com", "a")]);
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::failing("model overloaded");
    let (pipeline, store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let err = pipeline.create_insight(acme_request(&["p"])).await.unwrap_err();

    match err {
        InsightError::Pipeline { stage, insight, .. } => {
            assert_eq!(stage, PipelineStage::Synthesis);
            let stored = store.find_by_id(&insight.id).await?.unwrap();
            assert_eq!(stored.status, InsightStatus::Failed);
            assert!(stored.error.unwrap().contains("model overloaded"));
        }
        other => panic!("expected a pipeline failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_whole_extraction_failure_fails_the_run() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("p", vec![hit("https://a.example.com", "a")]);
    let extraction = MockExtractionProvider::new();
    extraction.fail_with("upstream unavailable");
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, _store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let err = pipeline.create_insight(acme_request(&["p"])).await.unwrap_err();

    assert!(matches!(
        err,
        InsightError::Pipeline {
            stage: PipelineStage::Extraction,
            ..
        }
    ));
    assert!(ai.get_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_partial_extraction_failure_still_completes() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results(
        "p",
        vec![
            hit("https://one.example.com", "one"),
            hit("https://two.example.com", "two"),
            hit("https://three.example.com", "three"),
        ],
    );
    let extraction = MockExtractionProvider::new();
    extraction.fail_url("https://two.example.com");
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, _store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let insight = pipeline.create_insight(acme_request(&["p"])).await?;

    assert_eq!(insight.status, InsightStatus::Completed);
    let content = &insight.results[0].content;
    assert_eq!(content.len(), 3);
    assert_eq!(content.iter().filter(|c| c.success).count(), 2);
    let failed = &content[1];
    assert_eq!(failed.url, "https://two.example.com");
    assert!(!failed.success);
    assert!(failed.error.is_some());
    assert!(!insight.results[0].context.contains("two.example.com"));
    Ok(())
}

#[tokio::test]
async fn test_zero_search_hits_skips_extraction() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new("Insufficient data in the provided context.");
    let (pipeline, _store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let insight = pipeline.create_insight(acme_request(&["nothing"])).await?;

    assert_eq!(insight.status, InsightStatus::Completed);
    assert!(insight.results[0].search_results.is_empty());
    assert!(insight.results[0].context.is_empty());
    assert!(extraction.get_calls().is_empty());
    assert_eq!(ai.get_calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_validation_happens_before_any_write_or_call() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::default();
    let (pipeline, store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let invalid = [
        InsightRequest::new("user-1", vec![], "AcmeCo", "widgets"),
        InsightRequest::new("user-1", to_strings(&["ok", "  "]), "AcmeCo", "widgets"),
        InsightRequest::new("user-1", to_strings(&["ok"]), "", "widgets"),
        InsightRequest::new("user-1", to_strings(&["ok"]), "AcmeCo", " "),
        InsightRequest::new("", to_strings(&["ok"]), "AcmeCo", "widgets"),
    ];
    for request in invalid {
        let result = pipeline.create_insight(request).await;
        assert!(matches!(result, Err(InsightError::Validation(_))));
    }

    assert!(store.is_empty().await);
    assert!(search.get_calls().is_empty());
    assert!(extraction.get_calls().is_empty());
    assert!(ai.get_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_skip_failed_policy_keeps_successful_prompts() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results("ok", vec![hit("https://a.example.com", "a")]);
    search.add_error("broken", "timeout");
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let config = PipelineConfig {
        search_failure_policy: SearchFailurePolicy::SkipFailed,
        ..Default::default()
    };
    let (pipeline, _store) = memory_pipeline(&search, &extraction, &ai, config)?;

    let insight = pipeline
        .create_insight(acme_request(&["broken", "ok"]))
        .await?;

    assert_eq!(insight.status, InsightStatus::Completed);
    assert_eq!(
        insight.results[0].search_results,
        vec![hit("https://a.example.com", "a")]
    );
    Ok(())
}

#[tokio::test]
async fn test_config_and_overrides_reach_the_providers() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    search.add_results(
        "p",
        (0..8)
            .map(|i| hit(&format!("https://{i}.example.com"), "hit"))
            .collect(),
    );
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let config = PipelineConfig {
        num_results: 3,
        ..Default::default()
    };
    let (pipeline, _store) = memory_pipeline(&search, &extraction, &ai, config)?;

    let mut request = acme_request(&["p"]);
    request.options = Some(GenerateOverrides {
        temperature: Some(0.1),
        ..Default::default()
    });
    let insight = pipeline.create_insight(request).await?;

    assert_eq!(insight.results[0].search_results.len(), 3);
    let calls = ai.get_calls();
    let (_, options) = &calls[0];
    assert_eq!(options.temperature, 0.1);
    assert_eq!(options.max_tokens, 4096);
    assert_eq!(options.top_k, 40);
    Ok(())
}

#[tokio::test]
async fn test_reads_are_idempotent_and_lists_are_newest_first() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::new(BRIEFING);
    let (pipeline, _store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let first = pipeline.create_insight(acme_request(&["one"])).await?;
    let second = pipeline.create_insight(acme_request(&["two"])).await?;
    let other = pipeline
        .create_insight(InsightRequest::new(
            "user-2",
            to_strings(&["three"]),
            "AcmeCo",
            "widgets",
        ))
        .await?;

    let read_once = pipeline.get_insight(&first.id).await?;
    let read_twice = pipeline.get_insight(&first.id).await?;
    assert_eq!(read_once, read_twice);

    let mine = pipeline.list_insights("user-1").await?;
    let ids: Vec<&str> = mine.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

    let summaries = pipeline.list_insight_summaries("user-1").await?;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, second.id);
    assert_eq!(summaries[0].status, InsightStatus::Completed);

    let all = pipeline.list_all_insights().await?;
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, other.id);

    assert!(pipeline.list_insights("nobody").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pending_draft_and_delete() -> anyhow::Result<()> {
    setup_tracing();
    let search = MockSearchProvider::new();
    let extraction = MockExtractionProvider::new();
    let ai = MockAiProvider::default();
    let (pipeline, store) =
        memory_pipeline(&search, &extraction, &ai, PipelineConfig::default())?;

    let draft = pipeline
        .create_pending_insight("user-1", to_strings(&["later"]))
        .await?;
    assert_eq!(draft.status, InsightStatus::Pending);
    assert!(draft.results.is_empty());
    assert!(draft.completed_at.is_none());
    assert!(search.get_calls().is_empty());

    let empty = pipeline.create_pending_insight("user-1", vec![]).await;
    assert!(matches!(empty, Err(InsightError::Validation(_))));

    pipeline.delete_insight(&draft.id).await?;
    assert!(store.is_empty().await);

    let missing = pipeline.get_insight(&draft.id).await;
    assert!(matches!(missing, Err(InsightError::NotFound(_))));
    let again = pipeline.delete_insight(&draft.id).await;
    assert!(matches!(again, Err(InsightError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_builder_requires_every_collaborator() {
    let result = brandsight::InsightPipeline::builder()
        .search_provider(Box::new(MockSearchProvider::new()))
        .build();
    assert!(matches!(result, Err(InsightError::MissingProvider(_))));
}
