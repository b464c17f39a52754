use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("找不到流程: {0}")]
    FlowNotFound(String),

    #[error("动作执行失败: {0}")]
    ActionExecutionError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("流程校验失败: {0}")]
    ValidationError(String),

    #[error("存储错误: {0}")]
    StoreError(String),

    #[error("域名不在白名单中: {0}")]
    DomainNotAllowed(String),

    #[error("目标地址被禁止: {host} -> {addr}")]
    BlockedAddress { host: String, addr: String },

    #[error("非法文件路径: {0}")]
    PathRejected(String),

    #[error("外部组件错误: {0}")]
    Bridge(String),

    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    /// 是否为安全拦截(SSRF / 路径穿越)
    pub fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            FlowError::DomainNotAllowed(_)
                | FlowError::BlockedAddress { .. }
                | FlowError::PathRejected(_)
        )
    }
}

impl From<anyhow::Error> for FlowError {
    fn from(e: anyhow::Error) -> Self {
        FlowError::Bridge(format!("{:#}", e))
    }
}
