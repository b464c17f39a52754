use crate::types::FlowError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 引擎配置,所有字段均有默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `write_file` 动作唯一允许写入的目录
    pub safe_dir: PathBuf,
    /// webhook 域名白名单,`*.domain` 表示允许一级子域名
    pub allowed_webhook_domains: Vec<String>,
    /// webhook 请求超时(毫秒)
    pub webhook_timeout_ms: u64,
    /// `delay` 动作的最大等待时间(毫秒)
    pub max_delay_ms: u64,
    /// 模板解析缓存容量
    pub template_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safe_dir: PathBuf::from("user_data/flow_logs"),
            allowed_webhook_domains: [
                "webhook.site",
                "discord.com",
                "discordapp.com",
                "hooks.slack.com",
                "api.telegram.org",
                "maker.ifttt.com",
                "hooks.zapier.com",
                "hook.eu1.make.com",
                "hook.us1.make.com",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            webhook_timeout_ms: 5000,
            max_delay_ms: 300_000,
            template_cache_capacity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn from_json(content: &str) -> Result<Self, FlowError> {
        serde_json::from_str(content).map_err(|e| FlowError::ConfigError(e.to_string()))
    }

    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| FlowError::ConfigError(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&content)
    }
}
