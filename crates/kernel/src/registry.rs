use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module, Phase};

/// Module registry driving the lifecycle of every registered module
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module; lifecycle hooks run in registration order
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// Get all registered modules in registration order
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Initialize all modules in registration order
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(phase = %Phase::Init, count = self.modules.len(), "module lifecycle");

        for module in &self.modules {
            tracing::debug!(module = module.name(), phase = %Phase::Init, "module hook");

            module
                .init(ctx)
                .await
                .with_context(|| failed(Phase::Init, module.as_ref()))?;
        }

        Ok(())
    }

    /// Start all modules in registration order
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(phase = %Phase::Start, count = self.modules.len(), "module lifecycle");

        for module in &self.modules {
            tracing::debug!(module = module.name(), phase = %Phase::Start, "module hook");

            module
                .start(ctx)
                .await
                .with_context(|| failed(Phase::Start, module.as_ref()))?;
        }

        Ok(())
    }

    /// Stop all modules in reverse registration order
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        tracing::info!(phase = %Phase::Stop, count = self.modules.len(), "module lifecycle");

        for module in self.modules.iter().rev() {
            tracing::debug!(module = module.name(), phase = %Phase::Stop, "module hook");

            module
                .stop()
                .await
                .with_context(|| failed(Phase::Stop, module.as_ref()))?;
        }

        Ok(())
    }
}

fn failed(phase: Phase, module: &dyn Module) -> String {
    format!("failed to {} module '{}'", phase, module.name())
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
