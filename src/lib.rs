pub mod aop;
pub mod bridge;
pub mod components;
pub mod config;
pub mod engine;
pub mod security;
pub mod types;

pub use config::EngineConfig;
pub use engine::{ActionServices, FlowDispatcher, FlowEngine, FlowStore, MemoryFlowStore};
pub use types::*;
