use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 一次触发的事件快照,引擎只读不写
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub event_type: String,
    pub data: Value,
    pub timestamp: i64,
}

impl Event {
    pub fn new(event_type: &str, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.to_string(),
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// 按点路径读取事件字段
    pub fn lookup(&self, path: &str) -> Lookup<'_> {
        lookup_path(&self.data, path)
    }
}

/// 字段查找结果,区分"字段不存在"与"字段值为 null/false/0"
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    Missing,
}

impl<'a> Lookup<'a> {
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }
}

/// 在 JSON 树上按 `a.b.c` 路径查找,数组段可用数字下标
pub fn lookup_path<'a>(data: &'a Value, path: &str) -> Lookup<'a> {
    // 完整键名优先,兼容本身带点的字段名
    if let Some(value) = data.as_object().and_then(|obj| obj.get(path)) {
        return Lookup::Found(value);
    }

    let mut current = data;
    for part in path.split('.') {
        let next = match current {
            Value::Object(obj) => obj.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Lookup::Missing,
        }
    }

    Lookup::Found(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_and_indexed_lookup() {
        let data = json!({
            "user": { "name": "bob", "badges": [{ "level": 3 }] },
            "flag": false
        });

        assert_eq!(lookup_path(&data, "user.name"), Lookup::Found(&json!("bob")));
        assert_eq!(
            lookup_path(&data, "user.badges.0.level"),
            Lookup::Found(&json!(3))
        );
        assert_eq!(lookup_path(&data, "flag"), Lookup::Found(&json!(false)));
        assert!(lookup_path(&data, "user.age").is_missing());
        assert!(lookup_path(&data, "flag.deeper").is_missing());
    }

    #[test]
    fn null_is_found_not_missing() {
        let data = json!({ "gift": null });
        assert_eq!(lookup_path(&data, "gift"), Lookup::Found(&Value::Null));
    }
}
