use chatdeck_core::reflection::{critique_prompt, round_key, FINAL_CONTENT_KEY};
use chatdeck_core::{
    DeckError, LlmClient, LlmResponse, Message, ReflectionEngine, ReflectionEvent,
    ReflectionStrategy, Role,
};
use std::error::Error as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::unbounded_channel;

/// Mock LLM that appends `{suffix}{call_number}` to the content it is given
/// and remembers every request.
struct StubLlm {
    suffix: &'static str,
    calls: AtomicUsize,
    fail_on: Option<usize>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl StubLlm {
    fn new(suffix: &'static str) -> Self {
        Self {
            suffix,
            calls: AtomicUsize::new(0),
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for StubLlm {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeckError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(messages.to_vec());

        if self.fail_on == Some(call) {
            return Err(DeckError::Llm("rate limit exceeded".into()));
        }

        Ok(LlmResponse {
            message: Message::assistant(format!("{}{}{}", messages[1].content, self.suffix, call)),
            usage: None,
        })
    }
}

/// Stateless mock: output depends only on the input content.
struct EchoLlm;

#[async_trait::async_trait]
impl LlmClient for EchoLlm {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeckError> {
        tokio::task::yield_now().await;
        Ok(LlmResponse {
            message: Message::assistant(format!("{}_v", messages[1].content)),
            usage: None,
        })
    }
}

fn engine(llm: &Arc<StubLlm>, max_rounds: usize, strategy: ReflectionStrategy) -> ReflectionEngine {
    let llm: Arc<dyn LlmClient> = llm.clone();
    ReflectionEngine::new(llm)
        .with_max_rounds(max_rounds)
        .with_strategy(strategy)
}

const STRATEGIES: [ReflectionStrategy; 2] =
    [ReflectionStrategy::Sequential, ReflectionStrategy::Graph];

// ========================================================================
// Round accounting
// ========================================================================

#[tokio::test]
async fn test_call_count_and_keys_for_each_max_rounds() {
    for strategy in STRATEGIES {
        for n in 1..=5 {
            let llm = Arc::new(StubLlm::new("+refined"));
            let history = engine(&llm, n, strategy)
                .optimize_content("topic", "system")
                .await
                .unwrap();

            assert_eq!(llm.calls(), n - 1, "{strategy:?} n={n}");
            assert_eq!(history.len(), n);
            assert_eq!(history.refinements(), n - 1);

            let mut expected: Vec<String> = (0..n).map(round_key).collect();
            expected.push(FINAL_CONTENT_KEY.to_string());
            assert_eq!(history.keys(), expected);
            assert_eq!(history.get(&round_key(n)), None);
        }
    }
}

#[tokio::test]
async fn test_default_max_rounds_is_three() {
    let llm = Arc::new(StubLlm::new("+r"));
    let llm_dyn: Arc<dyn LlmClient> = llm.clone();
    let engine = ReflectionEngine::new(llm_dyn);
    assert_eq!(engine.max_rounds(), 3);
    assert_eq!(engine.strategy(), ReflectionStrategy::Sequential);

    let history = engine.optimize_content("x", "s").await.unwrap();
    assert_eq!(llm.calls(), 2);
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn test_zero_max_rounds_is_clamped_to_one() {
    let llm = Arc::new(StubLlm::new("+r"));
    let engine = engine(&llm, 0, ReflectionStrategy::Sequential);
    assert_eq!(engine.max_rounds(), 1);

    let history = engine.optimize_content("x", "s").await.unwrap();
    assert_eq!(llm.calls(), 0);
    assert_eq!(history.final_content(), "x");
}

#[tokio::test]
async fn test_round_zero_is_unmodified_input() {
    let input = "  AI in education \n with trailing spaces  ";
    for strategy in STRATEGIES {
        let llm = Arc::new(StubLlm::new("+r"));
        let history = engine(&llm, 3, strategy)
            .optimize_content(input, "system")
            .await
            .unwrap();
        assert_eq!(history.get("round_0"), Some(input));
        assert_eq!(history.initial(), input);
    }
}

#[tokio::test]
async fn test_single_round_never_calls_llm() {
    for strategy in STRATEGIES {
        let llm = Arc::new(StubLlm::new("+r"));
        let history = engine(&llm, 1, strategy)
            .optimize_content("AI in education", "system")
            .await
            .unwrap();

        assert_eq!(llm.calls(), 0);
        assert_eq!(history.final_content(), "AI in education");
        assert_eq!(history.get("final_content"), Some("AI in education"));
        assert_eq!(history.keys(), vec!["round_0", "final_content"]);
    }
}

#[tokio::test]
async fn test_final_content_equals_last_round() {
    for strategy in STRATEGIES {
        for n in 1..=4 {
            let llm = Arc::new(StubLlm::new("+r"));
            let history = engine(&llm, n, strategy)
                .optimize_content("seed", "system")
                .await
                .unwrap();
            assert_eq!(
                history.get(FINAL_CONTENT_KEY),
                history.get(&round_key(n - 1))
            );
        }
    }
}

// ========================================================================
// Concrete scenario
// ========================================================================

#[tokio::test]
async fn test_ai_in_education_scenario() {
    for strategy in STRATEGIES {
        let llm = Arc::new(StubLlm::new("+refined"));
        let history = engine(&llm, 3, strategy)
            .optimize_content("AI in education", "You are a slide-content writer.")
            .await
            .unwrap();

        assert_eq!(history.get("round_0"), Some("AI in education"));
        assert_eq!(history.get("round_1"), Some("AI in education+refined1"));
        assert_eq!(
            history.get("round_2"),
            Some("AI in education+refined1+refined2")
        );
        assert_eq!(history.get("final_content"), history.get("round_2"));

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["final_content"], "AI in education+refined1+refined2");
    }
}

#[tokio::test]
async fn test_each_round_prompt_builds_on_previous_output() {
    let llm = Arc::new(StubLlm::new("+refined"));
    engine(&llm, 3, ReflectionStrategy::Sequential)
        .optimize_content("AI in education", "You are a slide-content writer.")
        .await
        .unwrap();

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);

    for (i, request) in requests.iter().enumerate() {
        let round = i + 1;
        let roles: Vec<Role> = request.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::System]);
        assert_eq!(request[0].content, "You are a slide-content writer.");
        assert_eq!(request[2].content, critique_prompt(round));
    }
    assert_eq!(requests[0][1].content, "AI in education");
    assert_eq!(requests[1][1].content, "AI in education+refined1");
}

// ========================================================================
// Sequential vs graph
// ========================================================================

#[tokio::test]
async fn test_sequential_and_graph_produce_identical_history() {
    for n in 1..=5 {
        let seq_llm = Arc::new(StubLlm::new("_v"));
        let graph_llm = Arc::new(StubLlm::new("_v"));

        let sequential = engine(&seq_llm, n, ReflectionStrategy::Sequential)
            .optimize_content("Quarterly review", "You write decks.")
            .await
            .unwrap();
        let graph = engine(&graph_llm, n, ReflectionStrategy::Graph)
            .optimize_content("Quarterly review", "You write decks.")
            .await
            .unwrap();

        assert_eq!(sequential, graph, "n={n}");
        assert_eq!(seq_llm.requests(), graph_llm.requests(), "n={n}");
    }
}

// ========================================================================
// Failure handling
// ========================================================================

#[tokio::test]
async fn test_failure_aborts_run_with_round_context() {
    for strategy in STRATEGIES {
        for k in 1..=3 {
            let llm = Arc::new(StubLlm::new("+r").failing_on(k));
            let result = engine(&llm, 4, strategy)
                .optimize_content("topic", "system")
                .await;

            let err = result.expect_err("run must fail");
            assert!(err.is_generation());
            assert_eq!(err.failed_round(), Some(k), "{strategy:?} k={k}");
            match &err {
                DeckError::Generation { source, .. } => {
                    assert!(matches!(**source, DeckError::Llm(ref m) if m == "rate limit exceeded"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
            assert!(err.source().is_some());
            // No retry, and nothing after the failing round ran.
            assert_eq!(llm.calls(), k);
        }
    }
}

#[tokio::test]
async fn test_empty_input_rejected_before_any_call() {
    for strategy in STRATEGIES {
        for input in ["", "   ", "\n\t"] {
            let llm = Arc::new(StubLlm::new("+r"));
            let err = engine(&llm, 3, strategy)
                .optimize_content(input, "system")
                .await
                .unwrap_err();
            assert!(matches!(err, DeckError::Input(_)));
            assert_eq!(llm.calls(), 0);
        }
    }
}

// ========================================================================
// Events
// ========================================================================

#[tokio::test]
async fn test_events_follow_rounds() {
    let llm = Arc::new(StubLlm::new("+r"));
    let (tx, mut rx) = unbounded_channel();
    engine(&llm, 3, ReflectionStrategy::Graph)
        .optimize_content_with_events("ab", "system", tx)
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            ReflectionEvent::RoundStarted { round: 1, total: 3 },
            ReflectionEvent::RoundCompleted { round: 1, chars: 5 },
            ReflectionEvent::RoundStarted { round: 2, total: 3 },
            ReflectionEvent::RoundCompleted { round: 2, chars: 8 },
            ReflectionEvent::Complete { rounds: 3 },
        ]
    );
}

#[tokio::test]
async fn test_error_event_on_failure() {
    let llm = Arc::new(StubLlm::new("+r").failing_on(1));
    let (tx, mut rx) = unbounded_channel();
    let result = engine(&llm, 2, ReflectionStrategy::Sequential)
        .optimize_content_with_events("ab", "system", tx)
        .await;
    assert!(result.is_err());

    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    assert!(matches!(last, Some(ReflectionEvent::Error(msg)) if msg.contains("round 1")));
}

#[tokio::test]
async fn test_dropped_receiver_does_not_fail_run() {
    let llm = Arc::new(StubLlm::new("+r"));
    let (tx, rx) = unbounded_channel();
    drop(rx);
    let history = engine(&llm, 3, ReflectionStrategy::Sequential)
        .optimize_content_with_events("ab", "system", tx)
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
}

// ========================================================================
// Concurrency
// ========================================================================

#[tokio::test]
async fn test_concurrent_runs_are_isolated() {
    let llm: Arc<dyn LlmClient> = Arc::new(EchoLlm);
    let engine = Arc::new(ReflectionEngine::new(llm).with_max_rounds(3));

    let topics = ["alpha", "beta", "gamma", "delta"];
    let runs = topics.iter().map(|topic| {
        let engine = engine.clone();
        async move { engine.optimize_content(topic, "system").await }
    });
    let results = futures::future::join_all(runs).await;

    for (topic, result) in topics.iter().zip(results) {
        let history = result.unwrap();
        assert_eq!(history.initial(), *topic);
        assert_eq!(history.final_content(), format!("{topic}_v_v"));
    }
}

#[tokio::test]
async fn test_concurrent_runs_on_spawned_tasks() {
    let llm: Arc<dyn LlmClient> = Arc::new(EchoLlm);
    let engine = Arc::new(
        ReflectionEngine::new(llm)
            .with_max_rounds(4)
            .with_strategy(ReflectionStrategy::Graph),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.optimize_content(&format!("deck{i}"), "s").await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let history = handle.await.unwrap().unwrap();
        assert_eq!(history.final_content(), format!("deck{i}_v_v_v"));
    }
}
