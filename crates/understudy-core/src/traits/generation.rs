// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for text-generation backends.

use async_trait::async_trait;

use crate::error::UnderstudyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BackendCapabilities, GenerationRequest, GenerationOutput};

/// Adapter for pluggable text-generation backends.
///
/// Backends take a fully assembled prompt string and sampling parameters
/// and return raw model output. Hosted APIs and local model daemons sit
/// behind this same contract so callers can switch providers without
/// changing assembly or extraction code.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Generates a raw continuation for the given prompt.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutput, UnderstudyError>;

    /// Returns the capability flags used to pick a prompt shape for this
    /// backend.
    fn capabilities(&self) -> BackendCapabilities;
}
