// Streaming pipeline tests: event ordering, synthetic rounds, cancellation.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tenet::constitution::{Constitution, Principle, PrincipleCategory};
use tenet::critique::{stream_full_pipeline, CritiqueEvent, LoopOptions};
use tenet::providers::{GenerationRequest, TextGenerator};

fn principle(id: &str, name: &str) -> Principle {
    Principle {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        category: PrincipleCategory::Custom,
        critique_instruction: format!("Check {}", name),
        revision_instruction: "Fix it".to_string(),
        weight: 1.0,
        enabled: true,
        examples: Vec::new(),
    }
}

fn constitution(principles: Vec<Principle>) -> Constitution {
    let mut c = Constitution::new("Stream Constitution", "stream tests");
    c.id = "stream-constitution".to_string();
    c.principles = principles;
    c
}

/// Generator whose critic always (or never) triggers and whose reviser
/// always rewrites to a fixed string.
struct StreamStub {
    trigger: bool,
    calls: AtomicUsize,
}

impl StreamStub {
    fn new(trigger: bool) -> Arc<Self> {
        Arc::new(Self {
            trigger,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenerator for StreamStub {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &request.system {
            None => Ok("the initial response text".to_string()),
            Some(s) if s.contains("AI critic") => {
                if self.trigger {
                    Ok(r#"{"triggered": true, "severity": 0.6, "critique": "bad", "suggestions": []}"#
                        .to_string())
                } else {
                    Ok(r#"{"triggered": false, "severity": 0.0, "critique": "fine", "suggestions": []}"#
                        .to_string())
                }
            }
            Some(_) => Ok("a completely rewritten text that shares nothing".to_string()),
        }
    }

    fn name(&self) -> &str {
        "stream-stub"
    }

    fn default_model(&self) -> &str {
        "stream-stub-model"
    }
}

fn event_name(event: &CritiqueEvent) -> &'static str {
    match event {
        CritiqueEvent::Generating => "generating",
        CritiqueEvent::Generated { .. } => "generated",
        CritiqueEvent::Critiquing { .. } => "critiquing",
        CritiqueEvent::Critiqued { .. } => "critiqued",
        CritiqueEvent::Revising { .. } => "revising",
        CritiqueEvent::Revised { .. } => "revised",
        CritiqueEvent::Complete { .. } => "complete",
        CritiqueEvent::Error { .. } => "error",
    }
}

async fn collect(mut rx: tokio::sync::mpsc::Receiver<CritiqueEvent>) -> Vec<CritiqueEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_event_order_with_revisions() {
    let stub = StreamStub::new(true);
    let rx = stream_full_pipeline(
        "prompt".to_string(),
        constitution(vec![principle("p1", "P1")]),
        stub.clone(),
        "m".to_string(),
        LoopOptions::default().with_max_rounds(2),
    );

    let events = collect(rx).await;
    let names: Vec<&str> = events.iter().map(event_name).collect();

    // Round 0 revises into new text; round 1 revises that text into the
    // same fixed string, converging on the final budgeted round.
    assert_eq!(
        names,
        vec![
            "generating",
            "generated",
            "critiquing",
            "critiqued",
            "revising",
            "revised",
            "critiquing",
            "critiqued",
            "revising",
            "revised",
            "complete",
        ]
    );

    match events.last().unwrap() {
        CritiqueEvent::Complete { result } => {
            assert_eq!(result.total_rounds, 2);
            assert!(!result.converged);
        }
        other => panic!("Expected complete event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_untriggered_round_is_synthetic_and_ends_stream() {
    let stub = StreamStub::new(false);
    let rx = stream_full_pipeline(
        "prompt".to_string(),
        constitution(vec![principle("p1", "P1")]),
        stub.clone(),
        "m".to_string(),
        LoopOptions::default(),
    );

    let events = collect(rx).await;
    let names: Vec<&str> = events.iter().map(event_name).collect();
    assert_eq!(
        names,
        vec!["generating", "generated", "critiquing", "critiqued", "complete"]
    );

    match events.last().unwrap() {
        CritiqueEvent::Complete { result } => {
            assert_eq!(result.total_rounds, 1);
            assert!(result.converged);
            let round = &result.rounds[0];
            assert_eq!(round.confidence, 1.0);
            assert_eq!(round.diff_summary, "No changes needed");
            assert_eq!(round.revised_response, round.input_response);
            assert!(round.principles_triggered.is_empty());
        }
        other => panic!("Expected complete event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_initial_generation_failure_emits_error_event() {
    struct NoInitial;

    #[async_trait]
    impl TextGenerator for NoInitial {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            match request.system {
                None => anyhow::bail!("model unavailable"),
                Some(_) => Ok(String::new()),
            }
        }

        fn name(&self) -> &str {
            "no-initial"
        }

        fn default_model(&self) -> &str {
            "no-initial-model"
        }
    }

    let rx = stream_full_pipeline(
        "prompt".to_string(),
        constitution(vec![principle("p1", "P1")]),
        Arc::new(NoInitial),
        "m".to_string(),
        LoopOptions::default(),
    );

    let events = collect(rx).await;
    let names: Vec<&str> = events.iter().map(event_name).collect();
    assert_eq!(names, vec!["generating", "error"]);

    match events.last().unwrap() {
        CritiqueEvent::Error { error } => assert!(error.contains("model unavailable")),
        other => panic!("Expected error event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dropped_receiver_stops_generation_calls() {
    let stub = StreamStub::new(true);
    let rx = stream_full_pipeline(
        "prompt".to_string(),
        constitution(vec![principle("p1", "P1")]),
        stub.clone(),
        "m".to_string(),
        LoopOptions::default(),
    );

    // Drop the stream before consuming anything: the producer's first send
    // fails and it must bail out before calling the generator.
    drop(rx);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_serialize_with_type_tags() {
    let event = CritiqueEvent::Critiquing { round: 1 };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "critiquing");
    assert_eq!(json["round"], 1);

    let event = CritiqueEvent::Generating;
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "generating");
}
