#![allow(dead_code)]

use async_trait::async_trait;
use flow_rs::bridge::{AlertConfig, AlertSink, Bridges, ObsBridge};
use flow_rs::security::HostResolver;
use flow_rs::{ActionServices, EngineConfig, FlowEngine, MemoryFlowStore};
use serde_json::Value;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedAlert {
    pub kind: String,
    pub event: Value,
    pub config: AlertConfig,
}

/// 记录所有收到的提醒
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    pub alerts: Mutex<Vec<RecordedAlert>>,
}

impl RecordingAlerts {
    pub fn texts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.config.text_template.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertSink for RecordingAlerts {
    async fn add_alert(&self, kind: &str, event_data: &Value, config: AlertConfig) -> anyhow::Result<()> {
        self.alerts.lock().unwrap().push(RecordedAlert {
            kind: kind.to_string(),
            event: event_data.clone(),
            config,
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingObs {
    pub scenes: Mutex<Vec<String>>,
}

#[async_trait]
impl ObsBridge for RecordingObs {
    async fn switch_scene(&self, scene: &str) -> anyhow::Result<()> {
        self.scenes.lock().unwrap().push(scene.to_string());
        Ok(())
    }
}

/// 固定的 DNS 记录,未登记的主机解析失败
#[derive(Debug, Default)]
pub struct StaticResolver {
    records: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn with(mut self, host: &str, ips: &[&str]) -> Self {
        self.records.insert(
            host.to_string(),
            ips.iter().map(|ip| ip.parse().unwrap()).collect(),
        );
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        self.records
            .get(host)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, host.to_string()))
    }
}

pub struct Harness {
    pub engine: FlowEngine,
    pub store: Arc<MemoryFlowStore>,
    pub alerts: Arc<RecordingAlerts>,
    pub obs: Arc<RecordingObs>,
    pub safe_dir: tempfile::TempDir,
}

pub async fn harness() -> Harness {
    harness_with(|config| config, |services| services).await
}

pub async fn harness_with(
    configure: impl FnOnce(EngineConfig) -> EngineConfig,
    customize: impl FnOnce(ActionServices) -> ActionServices,
) -> Harness {
    let safe_dir = tempfile::tempdir().unwrap();
    let config = configure(EngineConfig {
        safe_dir: safe_dir.path().to_path_buf(),
        allowed_webhook_domains: vec!["webhook.site".to_string(), "sub.webhook.site".to_string()],
        ..EngineConfig::default()
    });

    let alerts = Arc::new(RecordingAlerts::default());
    let obs = Arc::new(RecordingObs::default());
    let services = ActionServices::new(config)
        .unwrap()
        .with_resolver(Arc::new(StaticResolver::default()))
        .with_bridges(
            Bridges::default()
                .with_alerts(alerts.clone())
                .with_obs(obs.clone()),
        );

    let store = Arc::new(MemoryFlowStore::new());
    let engine = FlowEngine::new(store.clone(), customize(services)).await;

    Harness {
        engine,
        store,
        alerts,
        obs,
        safe_dir,
    }
}
