use crate::aop::{ActionInterceptor, EventInterceptor, InterceptorManager, LoggingInterceptor};
use crate::components::builtin_factories;
use crate::engine::condition;
use crate::engine::store::FLOWS_ENABLED_SETTING;
use crate::engine::template::{build_variables, refresh_clock, TemplateVars};
use crate::engine::{ActionFactory, ActionRegistry, ActionServices, FlowStore};
use crate::types::{
    Action, ActionContext, ActionDescriptor, Event, Flow, FlowError, FlowRun, FlowState,
};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

pub type DynFlowEngine = Arc<dyn FlowDispatcher + Send + Sync>;

/// 事件源使用的分发接口
#[async_trait]
pub trait FlowDispatcher: Debug + Send + Sync {
    /// 分发一个事件,按存储顺序依次执行所有匹配的流程
    async fn process_event(&self, event_type: &str, data: Value) -> Result<Vec<FlowRun>, FlowError>;

    /// 用合成事件试运行单个流程
    async fn test_flow(&self, flow_id: &str, overrides: Value) -> Result<FlowRun, FlowError>;
}

#[derive(Debug, Clone)]
pub struct FlowEngine {
    store: Arc<dyn FlowStore>,
    action_registry: Arc<ActionRegistry>,
    services: Arc<ActionServices>,
    interceptor_manager: Arc<RwLock<InterceptorManager>>,
}

impl FlowEngine {
    pub async fn new(store: Arc<dyn FlowStore>, services: ActionServices) -> Self {
        let action_registry = Arc::new(ActionRegistry::new());

        // 注册内置动作
        for (type_name, factory) in builtin_factories() {
            action_registry.register(type_name, factory).await;
        }

        let engine = Self {
            store,
            action_registry,
            services: Arc::new(services),
            interceptor_manager: Arc::new(RwLock::new(InterceptorManager::new())),
        };

        // 注册日志拦截器
        engine
            .interceptor_manager
            .write()
            .await
            .register_action_interceptor(Arc::new(LoggingInterceptor));

        engine
    }

    pub fn store(&self) -> &Arc<dyn FlowStore> {
        &self.store
    }

    pub fn services(&self) -> &ActionServices {
        &self.services
    }

    /// 注册自定义动作类型
    pub async fn register_action_type(&self, type_name: &str, factory: ActionFactory) {
        self.action_registry.register(type_name, factory).await;
    }

    /// 获取所有已注册的动作类型
    pub async fn get_registered_actions(&self) -> Vec<ActionDescriptor> {
        self.action_registry.get_descriptors().await
    }

    pub async fn add_action_interceptor(&self, interceptor: Arc<dyn ActionInterceptor>) {
        self.interceptor_manager
            .write()
            .await
            .register_action_interceptor(interceptor);
    }

    pub async fn add_event_interceptor(&self, interceptor: Arc<dyn EventInterceptor>) {
        self.interceptor_manager
            .write()
            .await
            .register_event_interceptor(interceptor);
    }

    /// 全局开关,缺省为开启
    pub async fn flows_enabled(&self) -> Result<bool, FlowError> {
        let setting = self.store.get_setting(FLOWS_ENABLED_SETTING).await?;
        Ok(setting.as_deref().map(str::trim) != Some("false"))
    }

    /// 分发已构造好的事件
    pub async fn dispatch(&self, event: &Event) -> Result<Vec<FlowRun>, FlowError> {
        if !self.flows_enabled().await? {
            debug!("流程已全局关闭, 忽略事件 {}", event.event_type);
            return Ok(Vec::new());
        }

        let interceptors = self.interceptor_manager.read().await.clone();
        interceptors.before_event(event).await?;

        let flows = self.store.list_enabled_flows().await?;
        let mut runs = Vec::new();
        for flow in flows.iter().filter(|f| f.trigger_type == event.event_type) {
            runs.push(self.execute_flow(flow, event, &interceptors).await);
        }

        interceptors.after_event(event).await?;
        Ok(runs)
    }

    /// 条件检查 + 依次执行全部动作,单个动作失败不影响后续动作
    async fn execute_flow(
        &self,
        flow: &Flow,
        event: &Event,
        interceptors: &InterceptorManager,
    ) -> FlowRun {
        if !condition::evaluate(flow.trigger_condition.as_ref(), &event.data) {
            debug!("流程 [{}] 条件不满足, 跳过", flow.name);
            return FlowRun {
                flow_id: flow.id.clone(),
                flow_name: flow.name.clone(),
                state: FlowState::Skipped,
                actions_attempted: 0,
            };
        }

        info!("执行流程 [{}], 触发事件: {}", flow.name, event.event_type);
        let mut variables = build_variables(event);

        for (index, action) in flow.actions.iter().enumerate() {
            // 时间变量取动作执行时刻
            refresh_clock(&mut variables);
            let outcome = AssertUnwindSafe(self.execute_action(
                flow,
                index,
                action,
                event,
                &variables,
                interceptors,
            ))
            .catch_unwind()
            .await;

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_security_rejection() => {
                    warn!(
                        "流程 [{}] 动作 #{} ({}) 被安全策略拦截: {}",
                        flow.name, index, action.action_type, e
                    );
                }
                Ok(Err(e)) => {
                    error!(
                        "流程 [{}] 动作 #{} ({}) 执行失败: {}",
                        flow.name, index, action.action_type, e
                    );
                }
                Err(_) => {
                    error!(
                        "流程 [{}] 动作 #{} ({}) 发生panic",
                        flow.name, index, action.action_type
                    );
                }
            }
        }

        FlowRun {
            flow_id: flow.id.clone(),
            flow_name: flow.name.clone(),
            state: FlowState::Completed,
            actions_attempted: flow.actions.len(),
        }
    }

    async fn execute_action(
        &self,
        flow: &Flow,
        index: usize,
        action: &Action,
        event: &Event,
        variables: &TemplateVars,
        interceptors: &InterceptorManager,
    ) -> Result<(), FlowError> {
        let handler = match self
            .action_registry
            .create_handler(&action.action_type, action.config())
            .await?
        {
            Some(handler) => handler,
            None => {
                warn!(
                    "流程 [{}] 包含未知动作类型: {}",
                    flow.name, action.action_type
                );
                return Ok(());
            }
        };

        let ctx = ActionContext::new(flow, index, event, variables, &self.services);

        // 动作执行前拦截
        interceptors.before_action(&ctx).await?;

        match handler.handle(&ctx).await {
            Ok(()) => interceptors.after_action(&ctx).await,
            Err(e) => {
                interceptors.action_error(&ctx, &e).await?;
                Err(e)
            }
        }
    }
}

/// 试运行使用的默认合成事件
pub fn default_test_event() -> Value {
    json!({
        "uniqueId": "testuser",
        "nickname": "Test User",
        "comment": "Test message",
        "giftName": "Rose",
        "coins": 1,
        "repeatCount": 1,
        "likeCount": 1,
        "totalCoins": 0
    })
}

#[async_trait]
impl FlowDispatcher for FlowEngine {
    async fn process_event(&self, event_type: &str, data: Value) -> Result<Vec<FlowRun>, FlowError> {
        let event = Event::new(event_type, data);
        self.dispatch(&event).await
    }

    async fn test_flow(&self, flow_id: &str, overrides: Value) -> Result<FlowRun, FlowError> {
        let flow = self
            .store
            .get_flow(flow_id)
            .await?
            .ok_or_else(|| FlowError::FlowNotFound(flow_id.to_string()))?;

        let mut data = default_test_event();
        if let (Some(base), Value::Object(extra)) = (data.as_object_mut(), overrides) {
            base.extend(extra);
        }

        info!("试运行流程 [{}]", flow.name);
        let event = Event::new(&flow.trigger_type, data);
        let interceptors = self.interceptor_manager.read().await.clone();
        Ok(self.execute_flow(&flow, &event, &interceptors).await)
    }
}
