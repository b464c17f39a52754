use crate::engine::schema::validate_flow;
use crate::engine::VersionManager;
use crate::types::{Flow, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use tokio::sync::RwLock;

/// 全局开关设置项
pub const FLOWS_ENABLED_SETTING: &str = "flows_enabled";

/// 流程存储接口
#[async_trait]
pub trait FlowStore: Send + Sync + Debug {
    /// 所有启用的流程,按存储顺序
    async fn list_enabled_flows(&self) -> Result<Vec<Flow>, FlowError>;

    async fn list_flows(&self) -> Result<Vec<Flow>, FlowError>;

    async fn get_flow(&self, id: &str) -> Result<Option<Flow>, FlowError>;

    /// 新增或更新,返回流程ID
    async fn save_flow(&self, flow: Flow) -> Result<String, FlowError>;

    async fn delete_flow(&self, id: &str) -> Result<(), FlowError>;

    async fn set_flow_enabled(&self, id: &str, enabled: bool) -> Result<(), FlowError>;

    async fn get_setting(&self, key: &str) -> Result<Option<String>, FlowError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), FlowError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlowDocument {
    List(Vec<Value>),
    Full {
        flows: Vec<Value>,
        #[serde(default)]
        settings: HashMap<String, Value>,
    },
}

/// 内存流程存储,保持插入顺序
#[derive(Debug, Default)]
pub struct MemoryFlowStore {
    flows: RwLock<Vec<Flow>>,
    settings: RwLock<HashMap<String, String>>,
    version_manager: VersionManager,
}

impl MemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 加载流程,支持数组或 `{ "flows": [...], "settings": {...} }`
    pub async fn load_json(&self, content: &str) -> Result<Vec<String>, FlowError> {
        let document: FlowDocument =
            serde_json::from_str(content).map_err(|e| FlowError::ConfigError(e.to_string()))?;

        let (flows, settings) = match document {
            FlowDocument::List(flows) => (flows, HashMap::new()),
            FlowDocument::Full { flows, settings } => (flows, settings),
        };

        let mut ids = Vec::with_capacity(flows.len());
        for value in flows {
            validate_flow(&value)?;
            let flow: Flow = serde_json::from_value(value)?;
            ids.push(self.save_flow(flow).await?);
        }

        for (key, value) in settings {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.set_setting(&key, &value).await?;
        }

        Ok(ids)
    }

    pub async fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<String>, FlowError> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| FlowError::StoreError(format!("{}: {}", path.as_ref().display(), e)))?;
        self.load_json(&content).await
    }
}

#[async_trait]
impl FlowStore for MemoryFlowStore {
    async fn list_enabled_flows(&self) -> Result<Vec<Flow>, FlowError> {
        Ok(self
            .flows
            .read()
            .await
            .iter()
            .filter(|f| f.enabled)
            .cloned()
            .collect())
    }

    async fn list_flows(&self) -> Result<Vec<Flow>, FlowError> {
        Ok(self.flows.read().await.clone())
    }

    async fn get_flow(&self, id: &str) -> Result<Option<Flow>, FlowError> {
        Ok(self.flows.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn save_flow(&self, mut flow: Flow) -> Result<String, FlowError> {
        validate_flow(&serde_json::to_value(&flow)?)?;

        let mut flows = self.flows.write().await;
        let existing = flows.iter().position(|f| f.id == flow.id);
        if let Some(index) = existing {
            flow.metadata.created_at = flows[index].metadata.created_at;
        }
        self.version_manager.stamp(&mut flow);

        let id = flow.id.clone();
        match existing {
            Some(index) => flows[index] = flow,
            None => flows.push(flow),
        }
        Ok(id)
    }

    async fn delete_flow(&self, id: &str) -> Result<(), FlowError> {
        let mut flows = self.flows.write().await;
        let index = flows
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FlowError::FlowNotFound(id.to_string()))?;
        flows.remove(index);
        Ok(())
    }

    async fn set_flow_enabled(&self, id: &str, enabled: bool) -> Result<(), FlowError> {
        let mut flows = self.flows.write().await;
        let flow = flows
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FlowError::FlowNotFound(id.to_string()))?;
        flow.enabled = enabled;
        self.version_manager.stamp(flow);
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, FlowError> {
        Ok(self.settings.read().await.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), FlowError> {
        self.settings
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
