use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 自动化流程定义: 触发类型 + 可选条件 + 有序动作列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    /// 流程唯一标识
    pub id: String,
    /// 流程名称
    #[serde(default)]
    pub name: String,
    /// 触发该流程的事件类型
    pub trigger_type: String,
    /// 触发条件,为空时总是匹配
    #[serde(default, alias = "condition")]
    pub trigger_condition: Option<Condition>,
    /// 按顺序执行的动作
    #[serde(default)]
    pub actions: Vec<Action>,
    /// 是否启用
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 流程元数据
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_enabled() -> bool {
    true
}

impl Flow {
    pub fn new(name: &str, trigger_type: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            trigger_type: trigger_type.to_string(),
            trigger_condition: None,
            actions: Vec::new(),
            enabled: true,
            metadata: Metadata::default(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.trigger_condition = Some(condition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// 流程元数据信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// 版本号
    #[serde(default)]
    pub version: u64,
    /// 创建时间戳
    #[serde(default)]
    pub created_at: i64,
    /// 最后更新时间戳
    #[serde(default)]
    pub updated_at: i64,
}

/// 单一的 字段/运算符/值 条件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: &str, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }
}

/// 条件运算符,未知运算符保留原始名称以便记录日志
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Unknown(String),
}

impl ConditionOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::GreaterOrEqual => "greater_or_equal",
            ConditionOperator::LessOrEqual => "less_or_equal",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::Unknown(name) => name,
        }
    }
}

impl From<String> for ConditionOperator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => ConditionOperator::Equals,
            "not_equals" => ConditionOperator::NotEquals,
            "greater_than" => ConditionOperator::GreaterThan,
            "less_than" => ConditionOperator::LessThan,
            "greater_or_equal" => ConditionOperator::GreaterOrEqual,
            "less_or_equal" => ConditionOperator::LessOrEqual,
            "contains" => ConditionOperator::Contains,
            "not_contains" => ConditionOperator::NotContains,
            "starts_with" => ConditionOperator::StartsWith,
            "ends_with" => ConditionOperator::EndsWith,
            _ => ConditionOperator::Unknown(name),
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 动作定义,`type` 决定由哪个处理器执行,其余字段为处理器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Action {
    /// `params` 不是对象时忽略
    pub fn new(action_type: &str, params: Value) -> Self {
        Self {
            action_type: action_type.to_string(),
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// 处理器工厂使用的配置
    pub fn config(&self) -> Value {
        Value::Object(self.params.clone())
    }
}
