use std::fmt;

use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Everything a module may read while it boots.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

impl<'a> InitCtx<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

/// Lifecycle step the registry is driving; used in logs and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Start,
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "initialize",
            Phase::Start => "start",
            Phase::Stop => "stop",
        })
    }
}

/// A feature slice of the service: its routes, its docs and its
/// lifecycle hooks.
///
/// Hooks run as `init` (load data, nothing served yet), `start` (server is
/// about to accept requests) and `stop` (after the server drained).
#[async_trait]
pub trait Module: Sync + Send {
    /// Also the mount point: routes are served under `/api/{name}`.
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to the mount point.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the mount point and
    /// `components.schemas`; merged into the service document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
