use crate::engine::condition::to_text;
use crate::types::{lookup_path, Event};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 模板变量表
pub type TemplateVars = Map<String, Value>;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\}")
        .unwrap_or_else(|e| panic!("Invalid placeholder regex: {e}"));
    static ref DEFAULT_ENGINE: TemplateEngine = TemplateEngine::new(1024);
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// `{name}` 占位符替换,解析结果按模板字符串缓存
#[derive(Debug)]
pub struct TemplateEngine {
    cache: Mutex<HashMap<String, Arc<Vec<Segment>>>>,
    capacity: usize,
}

impl TemplateEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// 渲染模板,找不到变量的占位符原样保留
    pub fn render(&self, text: &str, vars: &TemplateVars) -> String {
        if !text.contains('{') {
            return text.to_string();
        }

        let segments = self.compile(text);
        let mut output = String::with_capacity(text.len());
        for segment in segments.iter() {
            match segment {
                Segment::Literal(s) => output.push_str(s),
                Segment::Placeholder(name) => match resolve_var(vars, name) {
                    Some(value) => output.push_str(&to_text(Some(value))),
                    None => {
                        output.push('{');
                        output.push_str(name);
                        output.push('}');
                    }
                },
            }
        }
        output
    }

    /// 当前缓存的模板数
    pub fn cached_templates(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn compile(&self, text: &str) -> Arc<Vec<Segment>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(segments) = cache.get(text) {
            return segments.clone();
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(name.as_str().to_string()));
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_string()));
        }

        // 超出容量时整体清空
        if cache.len() >= self.capacity {
            cache.clear();
        }
        let segments = Arc::new(segments);
        cache.insert(text.to_string(), segments.clone());
        segments
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// 使用全局默认模板引擎渲染
pub fn render(text: &str, vars: &TemplateVars) -> String {
    DEFAULT_ENGINE.render(text, vars)
}

fn resolve_var<'a>(vars: &'a TemplateVars, name: &str) -> Option<&'a Value> {
    if let Some(value) = vars.get(name) {
        return Some(value);
    }
    let (head, rest) = name.split_once('.')?;
    vars.get(head).and_then(|v| lookup_path(v, rest).value())
}

/// 由事件生成标准模板变量
///
/// 事件的顶层字段全部可用,标准变量在同名时优先
pub fn build_variables(event: &Event) -> TemplateVars {
    let data = &event.data;
    let mut vars = data.as_object().cloned().unwrap_or_default();

    let text_of = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .filter_map(|k| data.get(*k))
            .map(|v| to_text(Some(v)))
            .find(|s| !s.is_empty())
    };
    let number_of = |key: &str, default: i64| -> Value {
        match data.get(key) {
            Some(Value::Number(n)) => Value::Number(n.clone()),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|n| json!(n))
                .unwrap_or_else(|_| json!(default)),
            _ => json!(default),
        }
    };

    let username = text_of(&["uniqueId", "nickname"]).unwrap_or_else(|| "Viewer".to_string());
    let nickname = text_of(&["nickname", "uniqueId"]).unwrap_or_else(|| "Viewer".to_string());
    let message = text_of(&["comment", "message"]).unwrap_or_default();
    let gift_name = text_of(&["giftName"]).unwrap_or_default();
    let coins = number_of("coins", 0);
    let repeat_count = number_of("repeatCount", 1);
    let like_count = number_of("likeCount", 1);
    let total_coins = number_of("totalCoins", 0);

    vars.insert("username".into(), json!(username));
    vars.insert("nickname".into(), json!(nickname));
    vars.insert("message".into(), json!(message));
    vars.insert("gift_name".into(), json!(gift_name));
    vars.insert("giftName".into(), json!(gift_name));
    vars.insert("coins".into(), coins);
    vars.insert("repeat_count".into(), repeat_count.clone());
    vars.insert("repeatCount".into(), repeat_count);
    vars.insert("like_count".into(), like_count.clone());
    vars.insert("likeCount".into(), like_count);
    vars.insert("total_coins".into(), total_coins.clone());
    vars.insert("totalCoins".into(), total_coins);
    vars.insert("event_type".into(), json!(event.event_type));
    refresh_clock(&mut vars);

    vars
}

/// 用当前本地时间更新 `timestamp` / `date` / `time`
pub fn refresh_clock(vars: &mut TemplateVars) {
    let now = chrono::Local::now();
    vars.insert("timestamp".into(), json!(now.to_rfc3339()));
    vars.insert("date".into(), json!(now.format("%Y-%m-%d").to_string()));
    vars.insert("time".into(), json!(now.format("%H:%M:%S").to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(value: Value) -> TemplateVars {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn replaces_known_placeholders() {
        let out = render(
            "Hi {username}, +{coins} coins",
            &vars(json!({ "username": "bob", "coins": 50 })),
        );
        assert_eq!(out, "Hi bob, +50 coins");
    }

    #[test]
    fn missing_placeholder_left_verbatim() {
        assert_eq!(render("{missing}", &TemplateVars::new()), "{missing}");
        assert_eq!(
            render("{a} and {b}", &vars(json!({ "a": 1 }))),
            "1 and {b}"
        );
    }

    #[test]
    fn non_identifier_braces_untouched() {
        let out = render("{\"json\": {username}} { x }", &vars(json!({ "username": "amy" })));
        assert_eq!(out, "{\"json\": amy} { x }");
    }

    #[test]
    fn dotted_placeholders_read_nested_values() {
        let out = render("{user.name}", &vars(json!({ "user": { "name": "kim" } })));
        assert_eq!(out, "kim");
    }

    #[test]
    fn cache_is_keyed_by_template() {
        let engine = TemplateEngine::new(8);
        let v = vars(json!({ "a": "x", "b": "y" }));
        assert_eq!(engine.render("{a}", &v), "x");
        assert_eq!(engine.render("{b}", &v), "y");
        assert_eq!(engine.render("{a}", &v), "x");
        assert_eq!(engine.cached_templates(), 2);
    }

    #[test]
    fn cache_is_bounded() {
        let engine = TemplateEngine::new(2);
        let v = TemplateVars::new();
        for i in 0..5 {
            engine.render(&format!("{{v{}}}", i), &v);
        }
        assert!(engine.cached_templates() <= 2);
    }

    #[test]
    fn standard_variables_with_fallbacks() {
        let event = Event::new("gift", json!({ "nickname": "Nick", "coins": 5, "giftName": "Rose" }));
        let v = build_variables(&event);
        assert_eq!(v["username"], json!("Nick"));
        assert_eq!(v["coins"], json!(5));
        assert_eq!(v["gift_name"], json!("Rose"));
        assert_eq!(v["repeat_count"], json!(1));
        assert_eq!(v["like_count"], json!(1));
        assert_eq!(v["total_coins"], json!(0));
        assert_eq!(v["event_type"], json!("gift"));
        assert!(v.contains_key("timestamp"));

        let anonymous = build_variables(&Event::new("follow", json!({})));
        assert_eq!(anonymous["username"], json!("Viewer"));
        assert_eq!(anonymous["coins"], json!(0));

        let with_id = build_variables(&Event::new("chat", json!({ "uniqueId": "u1", "nickname": "N" })));
        assert_eq!(with_id["username"], json!("u1"));
        assert_eq!(with_id["nickname"], json!("N"));
    }
}
