//! Settings, module trait, and module registry shared by every bookshelf crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module, Phase};
pub use registry::ModuleRegistry;
pub use settings::Settings;
