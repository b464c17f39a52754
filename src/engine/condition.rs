//! 条件求值: 单一 字段/运算符/值 谓词,永不返回错误

use crate::types::{lookup_path, Condition, ConditionOperator};
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::warn;

/// 条件为空时恒为真
pub fn evaluate(condition: Option<&Condition>, data: &Value) -> bool {
    match condition {
        Some(condition) => evaluate_condition(condition, data),
        None => true,
    }
}

pub fn evaluate_condition(condition: &Condition, data: &Value) -> bool {
    // 派生字段需在运算符分派前替换
    let field_value = resolve_field(&condition.field, data);
    let field_value = field_value.as_deref();
    let expected = &condition.value;

    match &condition.operator {
        ConditionOperator::Equals => loose_equals(field_value, expected),
        ConditionOperator::NotEquals => !loose_equals(field_value, expected),
        ConditionOperator::GreaterThan => to_number(field_value) > to_number(Some(expected)),
        ConditionOperator::LessThan => to_number(field_value) < to_number(Some(expected)),
        ConditionOperator::GreaterOrEqual => to_number(field_value) >= to_number(Some(expected)),
        ConditionOperator::LessOrEqual => to_number(field_value) <= to_number(Some(expected)),
        ConditionOperator::Contains => lower(field_value).contains(&lower(Some(expected))),
        ConditionOperator::NotContains => !lower(field_value).contains(&lower(Some(expected))),
        ConditionOperator::StartsWith => lower(field_value).starts_with(&lower(Some(expected))),
        ConditionOperator::EndsWith => lower(field_value).ends_with(&lower(Some(expected))),
        ConditionOperator::Unknown(name) => {
            warn!("未知的条件运算符: {}, 字段: {}", name, condition.field);
            false
        }
    }
}

/// 解析条件字段,`None` 表示字段不存在
pub fn resolve_field<'a>(field: &str, data: &'a Value) -> Option<Cow<'a, Value>> {
    match field {
        "superfan_level" | "superFanLevel" => Some(Cow::Owned(json!(superfan_level(data)))),
        "gift_type" | "giftType" => lookup_path(data, "giftName").value().map(Cow::Borrowed),
        "gift_value" | "giftValue" => lookup_path(data, "coins").value().map(Cow::Borrowed),
        _ => lookup_path(data, field).value().map(Cow::Borrowed),
    }
}

/// 从徽章数据或超粉标记推导超粉等级,非超粉为 0
pub fn superfan_level(data: &Value) -> u64 {
    for key in ["superFanLevel", "superfan_level"] {
        if let Some(level) = data.get(key).and_then(as_level) {
            return level;
        }
    }

    let badge_level = ["userBadges", "badges"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_array))
        .flatten()
        .filter(|badge| is_superfan_badge(badge))
        .map(|badge| badge.get("level").and_then(as_level).unwrap_or(1))
        .max();
    if let Some(level) = badge_level {
        return level;
    }

    let flagged = ["isSuperFan", "is_super_fan", "superFan"]
        .iter()
        .any(|key| data.get(*key).and_then(Value::as_bool).unwrap_or(false));
    if flagged {
        1
    } else {
        0
    }
}

fn is_superfan_badge(badge: &Value) -> bool {
    ["type", "name", "badgeSceneType"].iter().any(|key| {
        badge
            .get(*key)
            .map(|v| {
                let text = to_text(Some(v)).to_lowercase().replace(['_', ' ', '-'], "");
                text.contains("superfan")
            })
            .unwrap_or(false)
    })
}

fn as_level(value: &Value) -> Option<u64> {
    let n = to_number(Some(value));
    (n.is_finite() && n >= 0.0).then(|| n as u64)
}

/// 数值转换,无法转换时返回 NaN(所有 NaN 比较均为 false)
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                f64::NAN
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

/// 字符串形式,字段不存在时为空串
pub fn to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn lower(value: Option<&Value>) -> String {
    to_text(value).to_lowercase()
}

fn loose_equals(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    if actual.is_number() || expected.is_number() {
        let (a, b) = (to_number(Some(actual)), to_number(Some(expected)));
        if !a.is_nan() && !b.is_nan() {
            return a == b;
        }
    }

    to_text(Some(actual)) == to_text(Some(expected))
}
