use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 动作处理器特征,定义了动作的核心执行逻辑
#[async_trait]
pub trait ActionHandler: Send + Sync + std::fmt::Debug {
    /// 执行动作
    ///
    /// # Arguments
    /// * `ctx` - 动作执行上下文
    ///
    /// # Returns
    /// * `Result<(), FlowError>` - 错误只终止当前动作
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError>;

    /// 获取动作描述符
    fn get_descriptor(&self) -> ActionDescriptor;
}

/// 动作工厂函数类型,根据动作参数创建处理器实例
pub type ActionFactory =
    Arc<dyn Fn(serde_json::Value) -> Result<Arc<dyn ActionHandler>, FlowError> + Send + Sync>;

/// 由配置结构和构造函数生成工厂
pub fn factory<C, H>(build: fn(C) -> H) -> ActionFactory
where
    C: DeserializeOwned + 'static,
    H: ActionHandler + 'static,
{
    Arc::new(move |config| {
        let config: C = serde_json::from_value(config)?;
        Ok(Arc::new(build(config)) as Arc<dyn ActionHandler>)
    })
}

/// 动作注册表,管理所有已注册的动作类型
pub struct ActionRegistry {
    /// 存储工厂函数,key为动作类型名称(含别名)
    factories: RwLock<HashMap<String, ActionFactory>>,
    /// 存储动作描述符,key为动作类型名称
    descriptors: RwLock<HashMap<String, ActionDescriptor>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    /// 注册新的动作类型
    ///
    /// # Arguments
    /// * `type_name` - 动作类型名称
    /// * `factory` - 动作工厂函数
    pub async fn register(&self, type_name: &str, factory: ActionFactory) {
        let mut factories = self.factories.write().await;
        let mut descriptors = self.descriptors.write().await;

        // 用空配置创建一次实例以获取描述符
        match factory(serde_json::json!({})) {
            Ok(handler) => {
                let mut descriptor = handler.get_descriptor();
                descriptor.type_name = type_name.to_string();
                descriptors.insert(type_name.to_string(), descriptor);
                factories.insert(type_name.to_string(), factory);
            }
            Err(e) => {
                tracing::error!("Failed to register action type {}: {}", type_name, e);
            }
        }
    }

    /// 获取所有已注册动作的描述符
    pub async fn get_descriptors(&self) -> Vec<ActionDescriptor> {
        let descriptors = self.descriptors.read().await;
        let mut list: Vec<_> = descriptors.values().cloned().collect();
        list.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        list
    }

    /// 根据动作类型和参数创建处理器
    ///
    /// # Returns
    /// * `Ok(None)` - 未注册的动作类型
    /// * `Err(_)` - 参数无法解析
    pub async fn create_handler(
        &self,
        type_name: &str,
        config: serde_json::Value,
    ) -> Result<Option<Arc<dyn ActionHandler>>, FlowError> {
        let factory = match self.factories.read().await.get(type_name) {
            Some(factory) => factory.clone(),
            None => return Ok(None),
        };
        factory(config)
            .map(Some)
            .map_err(|e| FlowError::ConfigError(format!("动作 {} 参数错误: {}", type_name, e)))
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("factories", &"<action factories>")
            .field("descriptors", &"<action descriptors>")
            .finish()
    }
}
