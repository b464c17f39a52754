pub mod condition;
mod dispatcher;
mod registry;
mod schema;
mod services;
pub mod store;
pub mod template;
mod version;

pub use dispatcher::{default_test_event, DynFlowEngine, FlowDispatcher, FlowEngine};
pub use registry::*;
pub use schema::validate_flow;
pub use services::ActionServices;
pub use store::{FlowStore, MemoryFlowStore, FLOWS_ENABLED_SETTING};
pub use template::{build_variables, refresh_clock, render, TemplateEngine, TemplateVars};
pub use version::*;
