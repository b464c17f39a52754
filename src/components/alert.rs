use crate::bridge::AlertConfig;
use crate::components::lenient_u64;
use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

/// 提醒动作配置
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AlertActionConfig {
    /// 提醒文本模板
    #[serde(alias = "text_template", alias = "message")]
    pub text: String,
    #[serde(alias = "sound")]
    pub sound_file: Option<String>,
    #[serde(alias = "volume", deserialize_with = "lenient_u64")]
    pub sound_volume: Option<u64>,
    /// 显示时长(秒)
    #[serde(deserialize_with = "lenient_u64")]
    pub duration: Option<u64>,
}

#[derive(Debug)]
pub struct AlertAction {
    config: AlertActionConfig,
}

impl AlertAction {
    pub fn new(config: AlertActionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for AlertAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let alerts = &ctx.services.bridges.alerts;
        if !alerts.is_available() {
            warn!("提醒组件未安装, 跳过流程 [{}] 的提醒动作", ctx.flow.name);
            return Ok(());
        }

        let config = AlertConfig {
            text_template: ctx.render(&self.config.text),
            sound_file: self
                .config
                .sound_file
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| ctx.render(s)),
            sound_volume: self.config.sound_volume.unwrap_or(80).min(100) as u32,
            duration: self.config.duration.unwrap_or(5),
            enabled: true,
        };

        alerts.add_alert("flow", &ctx.event.data, config).await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            type_name: "alert".to_string(),
            name: "显示提醒".to_string(),
            description: "渲染文本并交给提醒组件显示,可附带音效".to_string(),
            requires_bridge: true,
        }
    }
}
