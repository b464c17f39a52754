use crate::engine::{ActionServices, TemplateVars};
use crate::types::{Event, Flow};
use serde_json::Value;

/// 动作执行上下文,包含动作执行所需的所有信息
///
/// 所有字段均为只读引用,同一流程内的动作看到的是同一份事件快照
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// 当前执行的流程
    pub flow: &'a Flow,
    /// 动作在流程中的下标
    pub action_index: usize,
    /// 触发事件
    pub event: &'a Event,
    /// 模板变量
    pub variables: &'a TemplateVars,
    /// 引擎共享服务(模板、安全校验、HTTP 客户端、外部组件)
    pub services: &'a ActionServices,
}

impl<'a> ActionContext<'a> {
    /// 创建新的动作上下文
    ///
    /// # Arguments
    /// * `flow` - 当前流程
    /// * `action_index` - 动作下标
    /// * `event` - 触发事件
    /// * `variables` - 由事件生成的模板变量
    /// * `services` - 引擎共享服务
    pub fn new(
        flow: &'a Flow,
        action_index: usize,
        event: &'a Event,
        variables: &'a TemplateVars,
        services: &'a ActionServices,
    ) -> Self {
        Self {
            flow,
            action_index,
            event,
            variables,
            services,
        }
    }

    /// 使用当前事件变量渲染模板文本
    pub fn render(&self, text: &str) -> String {
        self.services.templates.render(text, self.variables)
    }

    /// 递归渲染 JSON 中的所有字符串
    pub fn render_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.render(s)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.render_value(v)).collect()),
            Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), self.render_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
