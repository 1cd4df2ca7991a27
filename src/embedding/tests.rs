use super::*;
use std::path::PathBuf;

mod config_tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_encoder_config_new_infers_tokenizer() {
        let config = EncoderConfig::new("/models/minilm");
        assert_eq!(config.model_dir, PathBuf::from("/models/minilm"));
        assert_eq!(
            config.tokenizer_path,
            PathBuf::from("/models/minilm/tokenizer.json")
        );
        assert!(!config.testing_stub);
    }

    #[test]
    fn test_stub_config_always_validates() {
        assert!(EncoderConfig::stub().validate().is_ok());
    }

    #[test]
    fn test_empty_model_dir_is_invalid() {
        let err = EncoderConfig::default().validate().unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_missing_weights_reported_by_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = EncoderConfig::new(dir.path()).validate().unwrap_err();
        match err {
            EmbeddingError::ModelNotFound { path } => {
                assert!(path.ends_with("model.safetensors"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_complete_model_dir_validates() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["config.json", "model.safetensors", "tokenizer.json"] {
            std::fs::write(dir.path().join(file), "{}").unwrap();
        }
        assert!(EncoderConfig::new(dir.path()).validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_infers_tokenizer_from_model_dir() {
        unsafe {
            env::set_var(EncoderConfig::ENV_MODEL_PATH, "/custom/model");
            env::remove_var(EncoderConfig::ENV_TOKENIZER_PATH);
        }

        let config = EncoderConfig::from_env();
        assert_eq!(config.model_dir, PathBuf::from("/custom/model"));
        assert_eq!(
            config.tokenizer_path,
            PathBuf::from("/custom/model/tokenizer.json")
        );

        unsafe {
            env::remove_var(EncoderConfig::ENV_MODEL_PATH);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_whitespace_is_empty() {
        unsafe {
            env::set_var(EncoderConfig::ENV_MODEL_PATH, "   ");
            env::set_var(EncoderConfig::ENV_TOKENIZER_PATH, "\t");
        }

        let config = EncoderConfig::from_env();
        assert!(config.model_dir.as_os_str().is_empty());
        assert!(config.tokenizer_path.as_os_str().is_empty());

        unsafe {
            env::remove_var(EncoderConfig::ENV_MODEL_PATH);
            env::remove_var(EncoderConfig::ENV_TOKENIZER_PATH);
        }
    }
}

mod encoder_tests {
    use super::*;

    #[test]
    fn test_stub_embeddings_are_deterministic_and_normalised() {
        let encoder = SentenceEncoder::load(EncoderConfig::stub()).unwrap();
        assert!(encoder.is_stub());
        assert!(!encoder.is_accelerated());

        let a = encoder.embed("rust engineer").unwrap();
        let b = encoder.embed("rust engineer").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), encoder.embedding_dim());

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_stub_batch_matches_single() {
        let encoder = SentenceEncoder::load(EncoderConfig::stub()).unwrap();
        let batch = encoder.embed_batch(&["one", "two"]).unwrap();
        assert_eq!(batch[1], encoder.embed("two").unwrap());
        assert!(encoder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_cosine() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_missing_model_fails_to_load() {
        let err = SentenceEncoder::load(EncoderConfig::new("/nonexistent/model")).unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelNotFound { .. }));
    }
}

mod client_tests {
    use super::*;
    use crate::external::{AnalysisContext, AnalysisRequest, InferenceClient, InferenceError};

    fn client() -> EmbeddingInferenceClient {
        EmbeddingInferenceClient::new(SentenceEncoder::load(EncoderConfig::stub()).unwrap())
    }

    fn context(stage1: f64) -> AnalysisContext {
        AnalysisContext {
            profile_text: "data engineer\nSkills: Python, SQL".to_string(),
            profile_skills: vec!["Python".to_string(), "SQL".to_string()],
            stage1_skills: vec!["Python".to_string()],
            stage1_compatibility: stage1,
        }
    }

    #[tokio::test]
    async fn test_analysis_is_bounded_and_carries_embedding() {
        let client = client();
        let analysis = client
            .analyze("Python and Kafka, health insurance", &context(0.9))
            .await
            .unwrap();

        assert!((0.0..=0.95).contains(&analysis.compatibility));
        assert_eq!(analysis.skills, vec!["Python", "Kafka"]);
        assert_eq!(analysis.benefits, vec!["health insurance"]);
        assert_eq!(analysis.embedding.as_ref().map(Vec::len), Some(384));
        assert_eq!(client.name(), "embedding-stub");
        assert!(!client.is_accelerated());
    }

    #[tokio::test]
    async fn test_single_and_batch_agree_in_stub_mode() {
        let client = client();
        let requests = vec![
            AnalysisRequest {
                text: "Rust services".to_string(),
                context: context(0.4),
            },
            AnalysisRequest {
                text: "Java backend".to_string(),
                context: context(0.6),
            },
        ];

        let batch = client.analyze_batch(&requests).await.unwrap();
        let single = client
            .analyze(&requests[1].text, &requests[1].context)
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], single);
    }

    #[test]
    fn test_embedding_errors_map_to_inference_errors() {
        let unavailable: InferenceError = EmbeddingError::ModelNotFound {
            path: PathBuf::from("/x"),
        }
        .into();
        assert!(matches!(unavailable, InferenceError::Unavailable { .. }));

        let failed: InferenceError = EmbeddingError::Encode {
            reason: "boom".to_string(),
        }
        .into();
        assert!(matches!(failed, InferenceError::Failed { .. }));

        let tokenizer = EmbeddingError::Load {
            component: "tokenizer",
            reason: "missing".to_string(),
        };
        assert!(tokenizer.is_load_error());
        assert!(tokenizer.to_string().contains("tokenizer"));
        let mapped: InferenceError = tokenizer.into();
        assert!(matches!(mapped, InferenceError::Unavailable { .. }));
    }
}
