use crate::components::lenient_u64;
use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    #[serde(alias = "sound_file", alias = "sound")]
    pub file: String,
    #[serde(alias = "sound_volume", deserialize_with = "lenient_u64")]
    pub volume: Option<u64>,
}

/// 播放音效,实际播放由外部负责,这里只记录意图
#[derive(Debug)]
pub struct SoundAction {
    config: SoundConfig,
}

impl SoundAction {
    pub fn new(config: SoundConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for SoundAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let file = ctx.render(&self.config.file);
        if file.is_empty() {
            warn!("流程 [{}] 的音效动作没有指定文件", ctx.flow.name);
            return Ok(());
        }
        info!(
            "播放音效: {} (音量 {})",
            file,
            self.config.volume.unwrap_or(80).min(100)
        );
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            type_name: "sound".to_string(),
            name: "播放音效".to_string(),
            description: "按指定音量播放音效文件".to_string(),
            requires_bridge: false,
        }
    }
}
