use crate::bridge::Bridges;
use crate::config::EngineConfig;
use crate::engine::TemplateEngine;
use crate::security::{HostResolver, PathGuard, SystemResolver, UrlGuard};
use crate::types::FlowError;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;

/// 所有动作共享的服务
#[derive(Debug)]
pub struct ActionServices {
    pub config: EngineConfig,
    pub templates: TemplateEngine,
    pub url_guard: UrlGuard,
    pub path_guard: PathGuard,
    pub http: Client,
    pub bridges: Bridges,
}

impl ActionServices {
    pub fn new(config: EngineConfig) -> Result<Self, FlowError> {
        let http = Self::http_client_builder(&config).build()?;
        let url_guard = UrlGuard::new(
            config.allowed_webhook_domains.clone(),
            Arc::new(SystemResolver),
        );
        let path_guard = PathGuard::new(&config.safe_dir)?;

        Ok(Self {
            templates: TemplateEngine::new(config.template_cache_capacity),
            url_guard,
            path_guard,
            http,
            bridges: Bridges::default(),
            config,
        })
    }

    /// webhook 客户端的基础配置: 全局超时,不跟随重定向
    ///
    /// 重定向目标不经过 `UrlGuard` 校验,因此一律不跟随
    pub fn http_client_builder(config: &EngineConfig) -> ClientBuilder {
        Client::builder()
            .timeout(Duration::from_millis(config.webhook_timeout_ms))
            .redirect(Policy::none())
    }

    pub fn with_bridges(mut self, bridges: Bridges) -> Self {
        self.bridges = bridges;
        self
    }

    /// 替换 webhook 校验使用的 DNS 解析器
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.url_guard = UrlGuard::new(self.config.allowed_webhook_domains.clone(), resolver);
        self
    }

    /// 替换 HTTP 客户端,传入的客户端必须同样禁用重定向,
    /// 建议由 [`ActionServices::http_client_builder`] 构造
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }
}
