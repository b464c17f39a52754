use serde::{Deserialize, Serialize};

/// 动作类型描述,供编辑器列出可用动作
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionDescriptor {
    pub type_name: String,
    pub name: String,
    pub description: String,
    /// 依赖外部组件(OBS、VR 等)的动作
    #[serde(default)]
    pub requires_bridge: bool,
}
