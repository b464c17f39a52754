//! 外部组件接口: 提醒、OBS、聊天机器人、VR、OSC、表情雨及自定义动作
//!
//! 未安装的组件由 [`NoopBridge`] 代替,`is_available` 返回 false,
//! 动作处理器据此记录警告并跳过,而不是在每个调用点判空。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// 交给提醒组件的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub text_template: String,
    pub sound_file: Option<String>,
    pub sound_volume: u32,
    /// 显示时长(秒)
    pub duration: u64,
    pub enabled: bool,
}

#[async_trait]
pub trait AlertSink: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn add_alert(&self, kind: &str, event_data: &Value, config: AlertConfig) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ObsBridge: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn switch_scene(&self, scene: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ChatBridge: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn send_message(&self, message: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait VrBridge: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn mute_guest(&self, slot: u32, audio: bool, video: bool) -> anyhow::Result<()>;

    async fn set_layout(&self, layout: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait OscBridge: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn send(&self, address: &str, args: &[Value]) -> anyhow::Result<()>;
}

#[async_trait]
pub trait EmojiRainBridge: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn trigger(&self, emoji: &str, count: u32) -> anyhow::Result<()>;
}

/// 插件注册的自定义动作
#[async_trait]
pub trait CustomActionBridge: Send + Sync + Debug {
    fn is_available(&self) -> bool {
        true
    }

    async fn invoke(&self, name: &str, payload: &Value, event_data: &Value) -> anyhow::Result<()>;
}

/// 未安装的组件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBridge;

#[async_trait]
impl AlertSink for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn add_alert(&self, _kind: &str, _event_data: &Value, _config: AlertConfig) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ObsBridge for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn switch_scene(&self, _scene: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ChatBridge for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn send_message(&self, _message: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl VrBridge for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn mute_guest(&self, _slot: u32, _audio: bool, _video: bool) -> anyhow::Result<()> {
        Ok(())
    }

    async fn set_layout(&self, _layout: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl OscBridge for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn send(&self, _address: &str, _args: &[Value]) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl EmojiRainBridge for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn trigger(&self, _emoji: &str, _count: u32) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl CustomActionBridge for NoopBridge {
    fn is_available(&self) -> bool {
        false
    }

    async fn invoke(&self, _name: &str, _payload: &Value, _event_data: &Value) -> anyhow::Result<()> {
        Ok(())
    }
}

/// 引擎可用的全部外部组件
#[derive(Debug, Clone)]
pub struct Bridges {
    pub alerts: Arc<dyn AlertSink>,
    pub obs: Arc<dyn ObsBridge>,
    pub chat: Arc<dyn ChatBridge>,
    pub vr: Arc<dyn VrBridge>,
    pub osc: Arc<dyn OscBridge>,
    pub emoji_rain: Arc<dyn EmojiRainBridge>,
    pub custom: Arc<dyn CustomActionBridge>,
}

impl Default for Bridges {
    fn default() -> Self {
        Self {
            alerts: Arc::new(NoopBridge),
            obs: Arc::new(NoopBridge),
            chat: Arc::new(NoopBridge),
            vr: Arc::new(NoopBridge),
            osc: Arc::new(NoopBridge),
            emoji_rain: Arc::new(NoopBridge),
            custom: Arc::new(NoopBridge),
        }
    }
}

impl Bridges {
    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_obs(mut self, obs: Arc<dyn ObsBridge>) -> Self {
        self.obs = obs;
        self
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatBridge>) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_vr(mut self, vr: Arc<dyn VrBridge>) -> Self {
        self.vr = vr;
        self
    }

    pub fn with_osc(mut self, osc: Arc<dyn OscBridge>) -> Self {
        self.osc = osc;
        self
    }

    pub fn with_emoji_rain(mut self, emoji_rain: Arc<dyn EmojiRainBridge>) -> Self {
        self.emoji_rain = emoji_rain;
        self
    }

    pub fn with_custom(mut self, custom: Arc<dyn CustomActionBridge>) -> Self {
        self.custom = custom;
        self
    }
}
