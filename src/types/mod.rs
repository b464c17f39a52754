mod context;
mod descriptor;
mod error;
mod event;
mod flow;

pub use context::*;
pub use descriptor::*;
pub use error::*;
pub use event::*;
pub use flow::*;

use serde::{Deserialize, Serialize};

/// 流程在一次事件分发中的终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// 条件不满足,未执行任何动作
    Skipped,
    /// 所有动作均已尝试执行(不论单个动作成败)
    Completed,
}

/// 单个流程的执行记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRun {
    pub flow_id: String,
    pub flow_name: String,
    pub state: FlowState,
    /// 已尝试执行的动作数
    pub actions_attempted: usize,
}
