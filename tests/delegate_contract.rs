//! Contract tests for the HTTP model delegates.
//!
//! Verify exact wire-format compliance against a mock server: request
//! bodies carry the documented fields, response shapes parse, and failure
//! modes (non-success status, malformed body, timeout) map to the
//! documented error variants.

use solace::config::{EmotionConfig, GenerationConfig};
use solace::error::SolaceError;
use solace::model::{
    DialogueModel, EmotionModel, GenerationOptions, HttpDialogueModel, HttpEmotionModel,
    top_emotion,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generation_config(uri: &str) -> GenerationConfig {
    GenerationConfig {
        endpoint: uri.to_owned(),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn emotion_config(uri: &str) -> EmotionConfig {
    EmotionConfig {
        endpoint: uri.to_owned(),
        timeout_seconds: 5,
    }
}

// ── Generation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn generation_request_carries_ids_and_sampling_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({
            "input_ids": [5, 6, 7],
            "max_length": 1000,
            "temperature": 0.7,
            "top_k": 50,
            "top_p": 0.9,
            "no_repeat_ngram_size": 3,
            "do_sample": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output_ids": [5, 6, 7, 42, 43],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let model = HttpDialogueModel::new(&generation_config(&mock_server.uri())).unwrap();
    let output = model
        .generate(&[5, 6, 7], &GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(output, vec![5, 6, 7, 42, 43]);
}

#[tokio::test]
async fn generation_non_success_status_is_a_generation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let model = HttpDialogueModel::new(&generation_config(&mock_server.uri())).unwrap();
    let err = model
        .generate(&[1], &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SolaceError::Generation(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn generation_malformed_body_is_a_generation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tokens": []})))
        .mount(&mock_server)
        .await;

    let model = HttpDialogueModel::new(&generation_config(&mock_server.uri())).unwrap();
    let err = model
        .generate(&[1], &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("malformed"));
}

#[tokio::test]
async fn generation_timeout_is_a_timeout_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"output_ids": [1]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = generation_config(&mock_server.uri());
    config.timeout_seconds = 1;

    let model = HttpDialogueModel::new(&config).unwrap();
    let err = model
        .generate(&[1], &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SolaceError::Timeout(_)));
}

// ── Classification ──────────────────────────────────────────────────────

#[tokio::test]
async fn classify_sends_inputs_and_parses_nested_ranking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classify"))
        .and(body_partial_json(json!({"inputs": "I feel awful"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"label": "sadness", "score": 0.91},
            {"label": "anger", "score": 0.06},
        ]])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let model = HttpEmotionModel::new(&emotion_config(&mock_server.uri())).unwrap();
    let ranking = model.classify("I feel awful").await.unwrap();

    assert_eq!(ranking.len(), 2);
    let top = top_emotion(ranking).unwrap();
    assert_eq!(top.label, "sadness");
    assert!((top.score - 0.91).abs() < 1e-6);
}

#[tokio::test]
async fn classify_accepts_flat_ranking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"label": "joy", "score": 0.72}])),
        )
        .mount(&mock_server)
        .await;

    let model = HttpEmotionModel::new(&emotion_config(&mock_server.uri())).unwrap();
    let ranking = model.classify("great news").await.unwrap();

    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].label, "joy");
}

#[tokio::test]
async fn classify_non_success_status_is_a_classification_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let model = HttpEmotionModel::new(&emotion_config(&mock_server.uri())).unwrap();
    let err = model.classify("hello").await.unwrap_err();

    assert!(matches!(err, SolaceError::Classification(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn classify_empty_ranking_fails_top_extraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let model = HttpEmotionModel::new(&emotion_config(&mock_server.uri())).unwrap();
    let ranking = model.classify("hello").await.unwrap();
    assert!(ranking.is_empty());

    let err = top_emotion(ranking).unwrap_err();
    assert!(matches!(err, SolaceError::Classification(_)));
}
