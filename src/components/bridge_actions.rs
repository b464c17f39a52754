//! 依赖外部组件的动作: 组件未安装时记录警告并跳过

use crate::components::lenient_u64;
use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

fn bridge_missing(ctx: &ActionContext<'_>, bridge: &str) {
    warn!(
        "{} 未安装, 跳过流程 [{}] 的动作 #{}",
        bridge, ctx.flow.name, ctx.action_index
    );
}

fn descriptor(type_name: &str, name: &str, description: &str) -> ActionDescriptor {
    ActionDescriptor {
        type_name: type_name.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        requires_bridge: true,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ObsSceneConfig {
    #[serde(alias = "scene")]
    pub scene_name: String,
}

#[derive(Debug)]
pub struct ObsSceneAction {
    config: ObsSceneConfig,
}

impl ObsSceneAction {
    pub fn new(config: ObsSceneConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for ObsSceneAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let obs = &ctx.services.bridges.obs;
        if !obs.is_available() {
            bridge_missing(ctx, "OBS");
            return Ok(());
        }
        let scene = ctx.render(&self.config.scene_name);
        obs.switch_scene(&scene).await?;
        info!("OBS 切换场景: {}", scene);
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("obs_scene", "切换OBS场景", "切换到指定的OBS场景")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatMessageConfig {
    #[serde(alias = "text")]
    pub message: String,
}

#[derive(Debug)]
pub struct ChatMessageAction {
    config: ChatMessageConfig,
}

impl ChatMessageAction {
    pub fn new(config: ChatMessageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for ChatMessageAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let chat = &ctx.services.bridges.chat;
        if !chat.is_available() {
            bridge_missing(ctx, "聊天机器人");
            return Ok(());
        }
        chat.send_message(&ctx.render(&self.config.message)).await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("chat_message", "发送聊天消息", "通过聊天机器人发送渲染后的消息")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OscSendConfig {
    pub address: String,
    #[serde(alias = "arguments")]
    pub args: Vec<Value>,
}

#[derive(Debug)]
pub struct OscSendAction {
    config: OscSendConfig,
}

impl OscSendAction {
    pub fn new(config: OscSendConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for OscSendAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let osc = &ctx.services.bridges.osc;
        if !osc.is_available() {
            bridge_missing(ctx, "OSC");
            return Ok(());
        }
        if self.config.address.is_empty() {
            return Err(FlowError::ConfigError("OSC 动作缺少 address".to_string()));
        }
        let args: Vec<Value> = self.config.args.iter().map(|a| ctx.render_value(a)).collect();
        osc.send(&ctx.render(&self.config.address), &args).await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("osc_send", "发送OSC消息", "向OSC/VR桥发送地址和参数")
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VrMuteGuestConfig {
    #[serde(deserialize_with = "lenient_u64")]
    pub slot: Option<u64>,
    pub audio: bool,
    pub video: bool,
}

impl Default for VrMuteGuestConfig {
    fn default() -> Self {
        Self {
            slot: None,
            audio: true,
            video: false,
        }
    }
}

#[derive(Debug)]
pub struct VrMuteGuestAction {
    config: VrMuteGuestConfig,
}

impl VrMuteGuestAction {
    pub fn new(config: VrMuteGuestConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for VrMuteGuestAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let vr = &ctx.services.bridges.vr;
        if !vr.is_available() {
            bridge_missing(ctx, "VR 桥");
            return Ok(());
        }
        let slot = u32::try_from(self.config.slot.unwrap_or(0)).map_err(|_| {
            FlowError::ConfigError(format!("嘉宾席位超出范围: {:?}", self.config.slot))
        })?;
        vr.mute_guest(slot, self.config.audio, self.config.video).await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("vr_mute_guest", "嘉宾静音", "静音指定席位嘉宾的音频/视频")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VrLayoutConfig {
    #[serde(alias = "layout_name")]
    pub layout: String,
}

#[derive(Debug)]
pub struct VrLayoutAction {
    config: VrLayoutConfig,
}

impl VrLayoutAction {
    pub fn new(config: VrLayoutConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for VrLayoutAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let vr = &ctx.services.bridges.vr;
        if !vr.is_available() {
            bridge_missing(ctx, "VR 桥");
            return Ok(());
        }
        vr.set_layout(&ctx.render(&self.config.layout)).await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("vr_layout", "切换布局", "切换VR桥的画面布局")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmojiRainConfig {
    pub emoji: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub count: Option<u64>,
}

#[derive(Debug)]
pub struct EmojiRainAction {
    config: EmojiRainConfig,
}

impl EmojiRainAction {
    pub fn new(config: EmojiRainConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for EmojiRainAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let rain = &ctx.services.bridges.emoji_rain;
        if !rain.is_available() {
            bridge_missing(ctx, "表情雨");
            return Ok(());
        }
        let emoji = ctx.render(&self.config.emoji);
        let count = self.config.count.unwrap_or(10).min(u32::MAX as u64) as u32;
        rain.trigger(&emoji, count).await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("emoji_rain", "表情雨", "触发表情雨效果")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    #[serde(alias = "action")]
    pub name: String,
    #[serde(alias = "data")]
    pub payload: Value,
}

/// 交给插件处理的自定义动作
#[derive(Debug)]
pub struct CustomAction {
    config: CustomConfig,
}

impl CustomAction {
    pub fn new(config: CustomConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for CustomAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let custom = &ctx.services.bridges.custom;
        if !custom.is_available() {
            bridge_missing(ctx, "自定义动作插件");
            return Ok(());
        }
        let payload = ctx.render_value(&self.config.payload);
        custom
            .invoke(&self.config.name, &payload, &ctx.event.data)
            .await?;
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        descriptor("custom", "自定义动作", "交给插件处理的自定义动作")
    }
}
