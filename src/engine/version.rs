use crate::types::Flow;
use std::sync::atomic::{AtomicU64, Ordering};

/// 流程版本号分配
#[derive(Debug)]
pub struct VersionManager {
    next_version: AtomicU64,
}

impl VersionManager {
    pub fn new() -> Self {
        Self {
            next_version: AtomicU64::new(1),
        }
    }

    /// 为保存的流程分配新版本并更新元数据
    pub fn stamp(&self, flow: &mut Flow) {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let timestamp = chrono::Utc::now().timestamp_millis();
        flow.metadata.version = version;
        flow.metadata.updated_at = timestamp;
        if flow.metadata.created_at == 0 {
            flow.metadata.created_at = timestamp;
        }
    }
}

impl Default for VersionManager {
    fn default() -> Self {
        Self::new()
    }
}
