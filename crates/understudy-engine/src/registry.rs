// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named generation backends, switchable at runtime.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use understudy_core::{GenerationAdapter, UnderstudyError};

/// Registry of generation backends with one active at a time.
///
/// Registration happens at composition time; switching is a runtime
/// operation driven by the REPL or the host application.
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn GenerationAdapter>>,
    active: RwLock<String>,
}

impl BackendRegistry {
    /// Create an empty registry. An active backend must be selected with
    /// [`switch`](Self::switch) before use.
    pub fn new() -> Self {
        Self {
            backends: BTreeMap::new(),
            active: RwLock::new(String::new()),
        }
    }

    /// Register a backend under a name. The first registration becomes
    /// the active backend until a switch.
    pub fn register(&mut self, name: &str, backend: Arc<dyn GenerationAdapter>) {
        if self.backends.is_empty() {
            *self.active.get_mut() = name.to_string();
        }
        self.backends.insert(name.to_string(), backend);
    }

    /// Make `name` the active backend.
    pub async fn switch(&self, name: &str) -> Result<(), UnderstudyError> {
        if !self.backends.contains_key(name) {
            return Err(UnderstudyError::BackendNotFound {
                name: name.to_string(),
            });
        }
        *self.active.write().await = name.to_string();
        Ok(())
    }

    /// The active backend and its registered name.
    pub async fn active(&self) -> Result<(String, Arc<dyn GenerationAdapter>), UnderstudyError> {
        let name = self.active.read().await.clone();
        match self.backends.get(&name) {
            Some(backend) => Ok((name, backend.clone())),
            None => Err(UnderstudyError::BackendNotFound { name }),
        }
    }

    /// Registered backend names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
