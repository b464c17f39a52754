use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    pub command: String,
}

/// 命令执行已永久禁用,只记录警告
#[derive(Debug)]
pub struct CommandAction {
    config: CommandConfig,
}

impl CommandAction {
    pub fn new(config: CommandConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for CommandAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        warn!(
            "流程 [{}] 请求执行命令 {:?}, 命令执行已被禁用",
            ctx.flow.name, self.config.command
        );
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            type_name: "command".to_string(),
            name: "执行命令(已禁用)".to_string(),
            description: "出于安全原因不执行任何命令".to_string(),
            requires_bridge: false,
        }
    }
}
