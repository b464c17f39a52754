use crate::types::FlowError;
use lazy_static::lazy_static;
use serde_json::{json, Value};

lazy_static! {
    static ref FLOW_SCHEMA: Value = json!({
        "type": "object",
        "required": ["id", "trigger_type"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "name": { "type": "string" },
            "trigger_type": { "type": "string", "minLength": 1 },
            "trigger_condition": {
                "type": ["object", "null"],
                "required": ["field", "operator"],
                "properties": {
                    "field": { "type": "string", "minLength": 1 },
                    "operator": { "type": "string", "minLength": 1 }
                }
            },
            "actions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {
                        "type": { "type": "string", "minLength": 1 }
                    }
                }
            },
            "enabled": { "type": "boolean" }
        }
    });
    static ref FLOW_VALIDATOR: jsonschema::Validator = jsonschema::validator_for(&FLOW_SCHEMA)
        .unwrap_or_else(|e| panic!("Invalid flow schema: {e}"));
}

/// 按 JSON Schema 校验流程定义,返回全部错误
pub fn validate_flow(flow: &Value) -> Result<(), FlowError> {
    let errors: Vec<String> = FLOW_VALIDATOR.iter_errors(flow).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FlowError::ValidationError(errors.join("; ")))
    }
}
