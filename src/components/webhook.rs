use crate::components::lenient_u64;
use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub method: String,
    /// 请求体模板,为空时发送原始事件数据
    #[serde(alias = "payload", alias = "body_template")]
    pub body: Option<Value>,
    pub headers: HashMap<String, String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub timeout_ms: Option<u64>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "POST".to_string(),
            body: None,
            headers: HashMap::new(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug)]
pub struct WebhookAction {
    config: WebhookConfig,
}

impl WebhookAction {
    pub fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    fn build_body(&self, ctx: &ActionContext<'_>) -> Result<Value, FlowError> {
        match &self.config.body {
            None | Some(Value::Null) => Ok(ctx.event.data.clone()),
            // 字符串模板渲染后必须是合法 JSON
            Some(Value::String(template)) => {
                let rendered = ctx.render(template);
                serde_json::from_str(&rendered).map_err(|e| {
                    FlowError::ActionExecutionError(format!("请求体不是合法JSON: {}", e))
                })
            }
            Some(template) => Ok(ctx.render_value(template)),
        }
    }
}

#[async_trait]
impl ActionHandler for WebhookAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        if self.config.url.trim().is_empty() {
            return Err(FlowError::ConfigError("webhook 缺少 url".to_string()));
        }

        // 校验通过前不发出任何请求
        let url = ctx.services.url_guard.check(&self.config.url).await?;

        let method = Method::from_bytes(self.config.method.trim().to_uppercase().as_bytes())
            .map_err(|_| FlowError::ConfigError(format!("无效的HTTP方法: {}", self.config.method)))?;

        let mut request = ctx.services.http.request(method.clone(), url.clone());

        if !matches!(method, Method::GET | Method::HEAD) {
            request = request.json(&self.build_body(ctx)?);
        }

        // 自定义请求头覆盖默认值
        for (key, value) in &self.config.headers {
            request = request.header(key.as_str(), ctx.render(value));
        }

        if let Some(timeout_ms) = self.config.timeout_ms {
            let limit = ctx.services.config.webhook_timeout_ms.max(1);
            request = request.timeout(Duration::from_millis(timeout_ms.clamp(1, limit)));
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            info!("webhook {} {} -> {}", method, url, status);
        } else if status.is_redirection() {
            warn!(
                "webhook {} {} 返回重定向 {}, 不跟随: {:?}",
                method,
                url,
                status,
                response.headers().get(reqwest::header::LOCATION)
            );
        } else {
            warn!("webhook {} {} 返回错误状态码: {}", method, url, status);
        }
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            type_name: "webhook".to_string(),
            name: "Webhook".to_string(),
            description: "向白名单域名发送HTTP请求,拦截内网地址".to_string(),
            requires_bridge: false,
        }
    }
}
