/// Integration tests for the probe runner
/// Live HTTP scenarios run against wiremock; replay checks use a scripted prober
use std::sync::Mutex;
use std::time::Duration;

use authprobe::auth::AuthCredential;
use authprobe::bypass::BYPASS_HEADER_SETS;
use authprobe::display::{render_progress, run_interactive};
use authprobe::engine::HttpEngine;
use authprobe::models::{Endpoint, Method, Summary};
use authprobe::probe::{ProbeOutcome, Prober};
use authprobe::progress::{progress_channel, Phase, ProgressEvent, ProgressMessage};
use authprobe::runner::{ProbeRunner, RunOptions};
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers from a closure over (url, headers) and records every call
struct ScriptedProber<F> {
    script: F,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl<F> ScriptedProber<F>
where
    F: Fn(&str, &[(&str, &str)]) -> ProbeOutcome + Send + Sync,
{
    fn new(script: F) -> Self {
        Self { script, calls: Mutex::new(Vec::new()) }
    }
}

impl<F> Prober for ScriptedProber<F>
where
    F: Fn(&str, &[(&str, &str)]) -> ProbeOutcome + Send + Sync,
{
    async fn probe(&self, _method: Method, url: &str, headers: &[(&str, &str)]) -> ProbeOutcome {
        self.calls.lock().unwrap().push((
            url.to_string(),
            headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        ));
        (self.script)(url, headers)
    }
}

fn quiet() -> RunOptions {
    RunOptions { log_probes: false }
}

#[tokio::test]
async fn test_bypass_via_forwarded_for_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(header("X-Forwarded-For", "127.0.0.1"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let url = format!("{}/users/{{id}}", mock_server.uri());
    let endpoints = vec![Endpoint::new(Method::GET, "/users/{id}", url.clone())];
    let credential = AuthCredential::Bearer("good-token".to_string());

    let engine = HttpEngine::new(Duration::from_secs(5)).expect("client should build");
    let runner = ProbeRunner::new(engine, quiet());
    let (tx, mut rx) = progress_channel(16);
    let collector = tokio::spawn(async move {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }
        messages
    });

    let results = runner.run(&endpoints, Some(&credential), Some(&tx)).await;
    drop(tx);
    let messages = collector.await.unwrap();

    assert_eq!(results.unauthenticated.len(), 1);
    assert_eq!(results.unauthenticated[0].label, url);
    assert_eq!(results.unauthenticated[0].outcome, ProbeOutcome::status(401));
    assert_eq!(results.authenticated[0].outcome, ProbeOutcome::status(200));
    assert_eq!(results.bypass.len(), BYPASS_HEADER_SETS.len());
    assert_eq!(results.bypass[0].label, format!("{} (X-Forwarded-For)", url));
    assert_eq!(results.bypass[0].outcome, ProbeOutcome::status(200));

    assert_eq!(results.bypass_hits.len(), 1);
    assert!(results.bypass_hits[0].contains("(X-Forwarded-For)"));
    assert!(results.bypass_hits[0].contains("baseline=401 Unauthorized"));
    assert!(results.bypass_hits[0].contains("bypass=200 OK"));
    assert_eq!(results.idor_candidates, vec![url]);

    assert_eq!(
        messages.last(),
        Some(&ProgressMessage::Summary(Summary { bypass_hit_count: 1, idor_candidate_count: 1 }))
    );
}

#[tokio::test]
async fn test_unreachable_target_records_transport_errors() {
    // Nothing listens on port 1
    let endpoints = vec![
        Endpoint::new(Method::GET, "/health", "http://127.0.0.1:1/health"),
        Endpoint::new(Method::POST, "/accounts", "http://127.0.0.1:1/accounts"),
    ];
    let engine = HttpEngine::new(Duration::from_secs(2)).expect("client should build");
    let runner = ProbeRunner::new(engine, RunOptions::default());

    let results = runner
        .run(&endpoints, Some(&AuthCredential::Cookie("session=x".into())), None)
        .await;

    assert_eq!(results.unauthenticated.len(), 2);
    assert_eq!(results.authenticated.len(), 2);
    assert_eq!(results.bypass.len(), 2 * BYPASS_HEADER_SETS.len());
    assert!(results
        .unauthenticated
        .iter()
        .chain(&results.authenticated)
        .chain(&results.bypass)
        .all(|e| e.outcome.is_transport_error()));
    assert!(results.bypass_hits.is_empty());
    assert_eq!(results.idor_candidates, vec!["http://127.0.0.1:1/accounts".to_string()]);
}

#[tokio::test]
async fn test_hits_match_pairwise_comparison_with_baseline() {
    // Baseline depends on the endpoint; some header-sets change the answer
    let prober = ScriptedProber::new(|url: &str, headers: &[(&str, &str)]| {
        let spoofed = headers.first().map(|(k, _)| *k);
        match (url, spoofed) {
            (_, Some("Authorization")) => ProbeOutcome::status(200),
            ("http://api/a", Some("X-Client-IP")) => ProbeOutcome::TransportError,
            ("http://api/b", Some("Forwarded")) => ProbeOutcome::Status { code: 403, text: "FORBIDDEN".into() },
            ("http://api/b", _) => ProbeOutcome::status(403),
            ("http://api/c", _) => ProbeOutcome::TransportError,
            _ => ProbeOutcome::status(401),
        }
    });
    let endpoints = vec![
        Endpoint::new(Method::GET, "/a", "http://api/a"),
        Endpoint::new(Method::DELETE, "/b", "http://api/b"),
        Endpoint::new(Method::PUT, "/c", "http://api/c"),
    ];
    let runner = ProbeRunner::new(prober, quiet());
    let results = runner.run(&endpoints, None, None).await;

    // Replay: every (endpoint, header-set) pair against its endpoint's baseline
    let h = BYPASS_HEADER_SETS.len();
    let mut expected = 0;
    for (i, base) in results.unauthenticated.iter().enumerate() {
        for entry in &results.bypass[i * h..(i + 1) * h] {
            if entry.outcome != base.outcome {
                expected += 1;
            }
        }
    }
    assert_eq!(results.bypass_hits.len(), expected);

    // a: Authorization (200) and X-Client-IP (ERR) differ from 401
    // b: Authorization (200) differs from 403; "FORBIDDEN" is still 403
    // c: Authorization (200) differs from ERR
    assert_eq!(expected, 4);
    assert!(results.bypass_hits.iter().any(|h| h.starts_with("GET http://api/a (X-Client-IP)")));
    assert!(!results.bypass_hits.iter().any(|h| h.contains("(Forwarded)")));

    // No credential: the authenticated phase goes out with no headers at all
    let calls = runner.prober().calls.lock().unwrap();
    assert_eq!(calls.len(), 3 * (2 + h));
    assert!(calls[0].1.is_empty());
    assert!(calls[1].1.is_empty());
    assert_eq!(calls[2].1, vec![("X-Forwarded-For".to_string(), "127.0.0.1".to_string())]);
}

#[tokio::test]
async fn test_authenticated_phase_is_not_compared() {
    let prober = ScriptedProber::new(|_: &str, headers: &[(&str, &str)]| {
        if headers.iter().any(|(_, v)| *v == "session=real") {
            ProbeOutcome::status(200)
        } else {
            ProbeOutcome::status(401)
        }
    });
    let endpoints = vec![Endpoint::new(Method::GET, "/health", "http://api/health")];
    let runner = ProbeRunner::new(prober, quiet());
    let results = runner
        .run(&endpoints, Some(&AuthCredential::Cookie("session=real".into())), None)
        .await;

    assert_eq!(results.authenticated[0].outcome, ProbeOutcome::status(200));
    assert!(results.bypass_hits.is_empty());
    assert!(results.idor_candidates.is_empty());
    let calls = runner.prober().calls.lock().unwrap();
    assert_eq!(calls[1].1, vec![("Cookie".to_string(), "session=real".to_string())]);
}

#[tokio::test]
async fn test_progress_events_in_order_with_summary_last() {
    let prober = ScriptedProber::new(|_: &str, _: &[(&str, &str)]| ProbeOutcome::status(200));
    let endpoints = vec![
        Endpoint::new(Method::GET, "/one", "http://api/one"),
        Endpoint::new(Method::GET, "/two", "http://api/two"),
    ];
    let runner = ProbeRunner::new(prober, quiet());

    // Capacity 1: the runner has to wait for the consumer on every event
    let (tx, mut rx) = progress_channel(1);
    let collector = tokio::spawn(async move {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            let done = matches!(msg, ProgressMessage::Summary(_));
            messages.push(msg);
            if done {
                break;
            }
        }
        messages
    });
    runner.run(&endpoints, Some(&AuthCredential::Bearer("t".into())), Some(&tx)).await;
    let messages = collector.await.unwrap();

    let h = BYPASS_HEADER_SETS.len();
    assert_eq!(messages.len(), 2 * (2 + h) + 1);
    assert_eq!(
        messages.last(),
        Some(&ProgressMessage::Summary(Summary { bypass_hit_count: 0, idor_candidate_count: 0 }))
    );

    let events: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            ProgressMessage::Progress(e) => Some(e.clone()),
            ProgressMessage::Summary(_) => None,
        })
        .collect();
    assert!(events.windows(2).all(|w| w[0].current_index <= w[1].current_index));
    assert!(events.iter().all(|e| e.total == 2));

    let first: Vec<String> = events[..2 + h].iter().map(|e| e.phase.to_string()).collect();
    assert_eq!(first[0], "unauth");
    assert_eq!(first[1], "auth");
    assert_eq!(first[2], "bypass:X-Forwarded-For");
    assert_eq!(first[2 + h - 1], "bypass:Cookie");
    assert_eq!(events[2 + h].phase, Phase::Unauth);
    assert_eq!(events[2 + h].url, "http://api/two");
}

#[tokio::test]
async fn test_run_completes_after_receiver_dropped() {
    let prober = ScriptedProber::new(|_: &str, _: &[(&str, &str)]| ProbeOutcome::status(404));
    let endpoints = vec![Endpoint::new(Method::GET, "/teams", "http://api/teams")];
    let runner = ProbeRunner::new(prober, quiet());

    let (tx, rx) = progress_channel(1);
    drop(rx);
    let results = runner.run(&endpoints, None, Some(&tx)).await;

    assert_eq!(results.bypass.len(), BYPASS_HEADER_SETS.len());
    assert_eq!(results.idor_candidates.len(), 1);
}

#[tokio::test]
async fn test_every_run_starts_empty() {
    let prober = ScriptedProber::new(|_: &str, h: &[(&str, &str)]| {
        if h.is_empty() { ProbeOutcome::status(401) } else { ProbeOutcome::status(200) }
    });
    let endpoints = vec![Endpoint::new(Method::GET, "/org", "http://api/org")];
    let runner = ProbeRunner::new(prober, quiet());

    let first = runner.run(&endpoints, None, None).await;
    let second = runner.run(&endpoints, None, None).await;
    assert_eq!(first.bypass_hits.len(), BYPASS_HEADER_SETS.len());
    assert_eq!(second.bypass_hits, first.bypass_hits);
    assert_eq!(second.unauthenticated.len(), 1);
}

#[tokio::test]
async fn test_display_returns_summary_when_stream_ends() {
    let (tx, rx) = progress_channel(1);
    let summary = Summary { bypass_hit_count: 2, idor_candidate_count: 1 };
    let producer = tokio::spawn(async move {
        for (i, phase) in [Phase::Unauth, Phase::Auth, Phase::Bypass("Cookie")].into_iter().enumerate() {
            let event = ProgressEvent {
                current_index: i + 1,
                total: 3,
                method: Method::GET,
                url: "http://api/users/{id}".to_string(),
                phase,
            };
            tx.send(ProgressMessage::Progress(event)).await.unwrap();
        }
        tx.send(ProgressMessage::Summary(summary)).await.unwrap();
    });

    assert_eq!(render_progress(rx).await, Some(summary));
    producer.await.unwrap();
}

#[tokio::test]
async fn test_display_returns_none_when_stream_closes_early() {
    let (tx, rx) = progress_channel(1);
    let producer = tokio::spawn(async move {
        let event = ProgressEvent {
            current_index: 1,
            total: 5,
            method: Method::POST,
            url: "http://api/orders".to_string(),
            phase: Phase::Unauth,
        };
        tx.send(ProgressMessage::Progress(event)).await.unwrap();
        // sender dropped here without a summary
    });

    assert_eq!(render_progress(rx).await, None);
    producer.await.unwrap();
}

#[tokio::test]
async fn test_interactive_run_returns_full_results() {
    let prober = ScriptedProber::new(|_: &str, h: &[(&str, &str)]| {
        if h.iter().any(|(k, _)| *k == "X-Remote-IP") {
            ProbeOutcome::status(200)
        } else {
            ProbeOutcome::status(403)
        }
    });
    let endpoints = vec![
        Endpoint::new(Method::GET, "/projects/{id}", "http://api/projects/{id}"),
        Endpoint::new(Method::GET, "/health", "http://api/health"),
    ];
    let runner = ProbeRunner::new(prober, quiet());

    let results = run_interactive(runner, endpoints, Some(AuthCredential::Bearer("t".into())), 1)
        .await
        .expect("interactive run should complete");

    assert_eq!(results.unauthenticated.len(), 2);
    assert_eq!(results.authenticated.len(), 2);
    assert_eq!(results.bypass.len(), 2 * BYPASS_HEADER_SETS.len());
    assert_eq!(results.bypass_hits.len(), 2);
    assert!(results.bypass_hits.iter().all(|h| h.contains("(X-Remote-IP)")));
    assert_eq!(results.idor_candidates, vec!["http://api/projects/{id}".to_string()]);
}

#[tokio::test]
async fn test_each_phase_sends_only_its_own_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let url = format!("{}/health", mock_server.uri());
    let endpoints = vec![Endpoint::new(Method::GET, "/health", url)];
    let engine = HttpEngine::new(Duration::from_secs(5)).expect("client should build");
    let runner = ProbeRunner::new(engine, quiet());
    runner
        .run(&endpoints, Some(&AuthCredential::Cookie("session=real".into())), None)
        .await;

    let requests = mock_server.received_requests().await.expect("recording is on");
    assert_eq!(requests.len(), 2 + BYPASS_HEADER_SETS.len());

    let spoofable = ["authorization", "cookie", "x-forwarded-for", "x-originating-ip", "x-client-ip", "x-remote-ip", "forwarded"];
    let carried = |i: usize| -> Vec<String> {
        spoofable
            .iter()
            .filter(|name| requests[i].headers.contains_key(**name))
            .map(|name| name.to_string())
            .collect()
    };

    // Baseline carries none of them; only reqwest's implicit accept/host go along
    assert!(carried(0).is_empty());
    assert_eq!(carried(1), vec!["cookie".to_string()]);
    assert_eq!(requests[1].headers.get("cookie").unwrap(), "session=real");
    for (offset, set) in BYPASS_HEADER_SETS.iter().enumerate() {
        assert_eq!(carried(2 + offset), vec![set.name.to_lowercase()]);
    }
}
