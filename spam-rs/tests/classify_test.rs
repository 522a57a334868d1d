//! End-to-end classification tests against the fixture artifacts

use spam_rs::config::{ArtifactsConfig, NormalizerConfig};
use spam_rs::error::{ArtifactError, ArtifactKind, ClassifyError};
use spam_rs::model::{ArtifactCache, ModelArtifacts};
use spam_rs::spam::{ClassifyOutcome, ErrorCode, Label, PredictionService};
use spam_rs::text::{Normalizer, StemmerKind};
use std::path::PathBuf;

fn fixtures() -> ArtifactsConfig {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    ArtifactsConfig {
        vectorizer_path: dir.join("vectorizer.json"),
        model_path: dir.join("model.json"),
    }
}

fn service() -> PredictionService {
    let artifacts = ModelArtifacts::load(&fixtures()).unwrap();
    PredictionService::from_artifacts(Normalizer::default(), &artifacts)
}

#[test]
fn test_spam_message() {
    let service = service();
    let result = service
        .classify_detailed("WINNER!! Claim your FREE prize now, click here!!!")
        .unwrap();
    assert_eq!(result.normalized, "winner claim free prize click");
    assert_eq!(result.label, Label::Spam);
}

#[test]
fn test_ham_message() {
    let service = service();
    let result = service
        .classify_detailed("Hey, are we still meeting for lunch tomorrow?")
        .unwrap();
    assert_eq!(result.normalized, "hey still meet lunch tomorrow");
    assert_eq!(result.label, Label::NotSpam);
}

#[test]
fn test_more_messages() {
    let service = service();
    assert_eq!(
        service
            .classify("URGENT! You have WON a free entry, call now to claim your prize")
            .unwrap(),
        Label::Spam
    );
    assert_eq!(
        service.classify("Ok lar... Joking wif u oni...").unwrap(),
        Label::NotSpam
    );
}

#[test]
fn test_same_input_same_label() {
    let service = service();
    let messages = [
        "WINNER!! Claim your FREE prize now, click here!!!",
        "Hey, are we still meeting for lunch tomorrow?",
        "txt CALL free",
        "see you",
    ];
    for message in messages {
        let first = service.classify(message).unwrap();
        for _ in 0..5 {
            assert_eq!(service.classify(message).unwrap(), first, "{message}");
        }
    }
}

#[test]
fn test_empty_input() {
    let service = service();
    for raw in ["", "   ", "\n\t "] {
        assert!(matches!(service.classify(raw), Err(ClassifyError::EmptyInput)));
        assert_eq!(
            service.outcome(raw),
            ClassifyOutcome::Error {
                error: ErrorCode::EmptyInput
            }
        );
    }
}

#[test]
fn test_non_alphanumeric_input_gets_a_label() {
    let service = service();
    let result = service.classify_detailed("!!! $$$ ...").unwrap();
    assert_eq!(result.normalized, "");
    assert_eq!(result.label, Label::NotSpam);
}

#[test]
fn test_outcome_json() {
    let service = service();
    let outcome = service.outcome("Claim your free prize");
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        serde_json::json!({"label": "spam"})
    );
}

#[test]
fn test_service_from_cache() {
    let cache = ArtifactCache::new(fixtures());
    let service = PredictionService::from_cache(Normalizer::default(), &cache).unwrap();
    assert!(cache.is_loaded());
    assert_eq!(service.classify("free prize").unwrap(), Label::Spam);

    let again = PredictionService::from_cache(Normalizer::default(), &cache).unwrap();
    assert_eq!(again.classify("lunch tomorrow").unwrap(), Label::NotSpam);
    assert_eq!(cache.load_count(), 1);
}

#[test]
fn test_configured_normalizer() {
    let artifacts = ModelArtifacts::load(&fixtures()).unwrap();
    let config = NormalizerConfig {
        stemmer: StemmerKind::Porter,
        extra_stop_words: vec!["free".to_string(), "prize".to_string()],
    };
    let service = PredictionService::from_artifacts(Normalizer::from_config(&config), &artifacts);
    let result = service.classify_detailed("free prize lunch").unwrap();
    assert_eq!(result.normalized, "lunch");
    assert_eq!(result.label, Label::NotSpam);
}

#[test]
fn test_missing_artifact_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArtifactsConfig {
        vectorizer_path: fixtures().vectorizer_path,
        model_path: dir.path().join("model.json"),
    };

    let cache = ArtifactCache::new(config);
    let err = PredictionService::from_cache(Normalizer::default(), &cache).unwrap_err();
    assert_eq!(err.kind(), ArtifactKind::Classifier);
    assert!(matches!(err, ArtifactError::Io { .. }));
    assert!(!cache.is_loaded());
}

#[test]
fn test_structurally_invalid_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let vectorizer_path = dir.path().join("vectorizer.json");
    std::fs::write(
        &vectorizer_path,
        r#"{"vocabulary": {"free": 0, "prize": 1}, "idf": [1.0]}"#,
    )
    .unwrap();

    let err = ModelArtifacts::load_paths(&vectorizer_path, &fixtures().model_path).unwrap_err();
    assert_eq!(err.kind(), ArtifactKind::Vectorizer);
    assert!(err.to_string().contains("idf has 1 weights for 2 terms"));
}

#[test]
fn test_linear_model_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    let mut coef = vec![1.5; 6];
    coef.extend([-1.5; 5]);
    coef.push(1.0);
    let model = serde_json::json!({
        "kind": "linear",
        "classes": [0, 1],
        "coef": coef,
        "intercept": -0.4,
    });
    std::fs::write(&model_path, model.to_string()).unwrap();

    let artifacts = ModelArtifacts::load_paths(&fixtures().vectorizer_path, &model_path).unwrap();
    let service = PredictionService::from_artifacts(Normalizer::default(), &artifacts);
    assert_eq!(service.classify("Claim your FREE prize").unwrap(), Label::Spam);
    assert_eq!(service.classify("lunch tomorrow?").unwrap(), Label::NotSpam);
    assert_eq!(service.classify("...").unwrap(), Label::NotSpam);
}
