use crate::types::{ActionContext, Event, FlowError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// 动作拦截器特征,用于在动作执行的不同阶段进行拦截处理
#[async_trait]
pub trait ActionInterceptor: Send + Sync + std::fmt::Debug {
    /// 动作执行前的拦截处理,返回错误将跳过该动作
    ///
    /// # Arguments
    /// * `ctx` - 动作执行上下文
    async fn before(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError>;

    /// 动作执行成功后的拦截处理
    async fn after(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError>;

    /// 动作执行出错时的拦截处理
    ///
    /// # Arguments
    /// * `ctx` - 动作执行上下文
    /// * `error` - 错误信息
    async fn error(&self, ctx: &ActionContext<'_>, error: &FlowError) -> Result<(), FlowError>;
}

/// 事件拦截器特征,用于在事件分发前后进行拦截处理
#[async_trait]
pub trait EventInterceptor: Send + Sync + std::fmt::Debug {
    /// 事件分发前,返回错误将中止本次分发
    async fn before_event(&self, event: &Event) -> Result<(), FlowError>;

    /// 事件分发后
    async fn after_event(&self, event: &Event) -> Result<(), FlowError>;
}

/// 拦截器管理器,用于管理和执行所有注册的拦截器
#[derive(Debug, Clone, Default)]
pub struct InterceptorManager {
    action_interceptors: Vec<Arc<dyn ActionInterceptor>>,
    event_interceptors: Vec<Arc<dyn EventInterceptor>>,
}

impl InterceptorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_action_interceptor(&mut self, interceptor: Arc<dyn ActionInterceptor>) {
        self.action_interceptors.push(interceptor);
    }

    pub fn register_event_interceptor(&mut self, interceptor: Arc<dyn EventInterceptor>) {
        self.event_interceptors.push(interceptor);
    }

    pub async fn before_action(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        for interceptor in &self.action_interceptors {
            interceptor.before(ctx).await?;
        }
        Ok(())
    }

    pub async fn after_action(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        for interceptor in &self.action_interceptors {
            interceptor.after(ctx).await?;
        }
        Ok(())
    }

    pub async fn action_error(&self, ctx: &ActionContext<'_>, error: &FlowError) -> Result<(), FlowError> {
        for interceptor in &self.action_interceptors {
            interceptor.error(ctx, error).await?;
        }
        Ok(())
    }

    pub async fn before_event(&self, event: &Event) -> Result<(), FlowError> {
        for interceptor in &self.event_interceptors {
            interceptor.before_event(event).await?;
        }
        Ok(())
    }

    pub async fn after_event(&self, event: &Event) -> Result<(), FlowError> {
        for interceptor in &self.event_interceptors {
            interceptor.after_event(event).await?;
        }
        Ok(())
    }
}

/// 日志拦截器,引擎默认注册
#[derive(Debug)]
pub struct LoggingInterceptor;

#[async_trait]
impl ActionInterceptor for LoggingInterceptor {
    async fn before(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        debug!(
            "流程 [{}] 开始执行动作 #{}, 事件: {}",
            ctx.flow.name, ctx.action_index, ctx.event.id
        );
        Ok(())
    }

    async fn after(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        info!(
            "流程 [{}] 动作 #{} ({}) 执行完成",
            ctx.flow.name,
            ctx.action_index,
            ctx.flow
                .actions
                .get(ctx.action_index)
                .map(|a| a.action_type.as_str())
                .unwrap_or("?")
        );
        Ok(())
    }

    async fn error(&self, ctx: &ActionContext<'_>, error: &FlowError) -> Result<(), FlowError> {
        debug!(
            "流程 [{}] 动作 #{} 执行出错: {}",
            ctx.flow.name, ctx.action_index, error
        );
        Ok(())
    }
}
