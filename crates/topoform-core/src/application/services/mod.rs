//! Application services orchestrating the generation pipeline.

pub mod compose_service;
pub mod dependency_deriver;
pub mod flag_resolver;

pub use compose_service::ComposeService;
pub use dependency_deriver::DependencyDeriver;
pub use flag_resolver::FlagResolver;
