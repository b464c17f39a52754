use crate::components::lenient_u64;
use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// 延迟动作配置
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// 延迟时间(毫秒)
    #[serde(alias = "delay_ms", alias = "ms", deserialize_with = "lenient_u64")]
    pub duration: Option<u64>,
}

/// 延迟动作,只挂起当前流程的后续动作
#[derive(Debug)]
pub struct DelayAction {
    config: DelayConfig,
}

impl DelayAction {
    pub fn new(config: DelayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for DelayAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let delay_ms = self
            .config
            .duration
            .unwrap_or(1000)
            .min(ctx.services.config.max_delay_ms);
        debug!("流程 [{}] 延迟 {}ms", ctx.flow.name, delay_ms);
        sleep(Duration::from_millis(delay_ms)).await;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            type_name: "delay".to_string(),
            name: "延时".to_string(),
            description: "等待指定时间后继续执行后续动作".to_string(),
            requires_bridge: false,
        }
    }
}
