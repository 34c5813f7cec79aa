// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Understudy dialogue engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Understudy workspace. All adapter
//! plugins implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::UnderstudyError;
pub use types::{
    AdapterType, BackendCapabilities, EmbeddingInput, EmbeddingOutput, GenerationOutput,
    GenerationRequest, HealthStatus, SamplingParams, SessionId,
};

// Re-export all adapter traits at crate root.
pub use traits::{EmbeddingAdapter, GenerationAdapter, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn understudy_error_has_all_variants() {
        // Verify all 8 error variants exist and can be constructed.
        let _config = UnderstudyError::Config("test".into());
        let _storage = UnderstudyError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _embedding = UnderstudyError::Embedding {
            message: "test".into(),
            source: None,
        };
        let _backend = UnderstudyError::Backend {
            message: "test".into(),
            source: None,
        };
        let _not_found = UnderstudyError::BackendNotFound {
            name: "test".into(),
        };
        let _health = UnderstudyError::HealthCheckFailed {
            name: "test".into(),
            source: Box::new(std::io::Error::other("test")),
        };
        let _timeout = UnderstudyError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = UnderstudyError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        let variants = [AdapterType::Generation, AdapterType::Embedding];

        // Verify Display and FromStr round-trip for all variants.
        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn adapter_type_serialization() {
        let generation = AdapterType::Generation;
        let json = serde_json::to_string(&generation).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(generation, parsed);
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn sampling_params_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.max_new_tokens, 80);
        assert!((params.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(params.top_k, 50);
        assert!((params.top_p - 0.9).abs() < f64::EPSILON);
        assert!((params.repetition_penalty - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // This test verifies that the adapter trait hierarchy compiles and
        // is accessible through the public API. If any module is missing or
        // has a compile error, this test won't compile.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_generation_adapter<T: GenerationAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
    }
}
