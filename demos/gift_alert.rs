use async_trait::async_trait;
use flow_rs::bridge::{AlertConfig, AlertSink, Bridges};
use flow_rs::{ActionServices, EngineConfig, FlowDispatcher, FlowEngine, MemoryFlowStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, Level};

// 打印到日志的提醒组件
#[derive(Debug)]
struct ConsoleAlerts;

#[async_trait]
impl AlertSink for ConsoleAlerts {
    async fn add_alert(&self, kind: &str, _event_data: &Value, config: AlertConfig) -> anyhow::Result<()> {
        info!(
            "[{}] 提醒: {} (音效: {:?}, 音量: {}, 时长: {}s)",
            kind, config.text_template, config.sound_file, config.sound_volume, config.duration
        );
        Ok(())
    }
}

const FLOWS: &str = r#"{
    "flows": [
        {
            "id": "big-gift",
            "name": "大额礼物提醒",
            "trigger_type": "gift",
            "trigger_condition": { "field": "coins", "operator": "greater_or_equal", "value": 500 },
            "actions": [
                { "type": "alert", "text": "{username} 送出了 {gift_name} x{repeat_count}!", "sound": "tada.mp3" },
                { "type": "log_to_file", "path": "gifts.log", "content": "{date} {time} {username} {coins}" }
            ]
        },
        {
            "id": "hello",
            "name": "打招呼",
            "trigger_type": "chat",
            "trigger_condition": { "field": "comment", "operator": "contains", "value": "hello" },
            "actions": [
                { "type": "show_alert", "text_template": "{nickname} 说: {message}" },
                { "type": "obs_scene", "scene": "Greeting" }
            ]
        }
    ],
    "settings": { "flows_enabled": "true" }
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志系统
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let config = EngineConfig {
        safe_dir: std::env::temp_dir().join("flow-rs-demo"),
        ..EngineConfig::default()
    };
    let services =
        ActionServices::new(config)?.with_bridges(Bridges::default().with_alerts(Arc::new(ConsoleAlerts)));

    let store = Arc::new(MemoryFlowStore::new());
    let loaded = store.load_json(FLOWS).await?;
    info!("已加载流程: {:?}", loaded);

    let engine = FlowEngine::new(store, services).await;

    let events = [
        ("gift", json!({ "uniqueId": "alice", "giftName": "Rose", "coins": 1 })),
        ("gift", json!({ "uniqueId": "bob", "giftName": "Lion", "coins": 29999, "repeatCount": 2 })),
        ("chat", json!({ "uniqueId": "carol", "nickname": "Carol", "comment": "Hello everyone" })),
    ];

    for (event_type, data) in events {
        let runs = engine.process_event(event_type, data).await?;
        for run in runs {
            info!("流程 [{}] 结果: {:?}", run.flow_name, run.state);
        }
    }

    // 试运行
    let run = engine.test_flow("big-gift", json!({ "coins": 500 })).await?;
    info!("试运行结果: {:?}", run.state);

    Ok(())
}
