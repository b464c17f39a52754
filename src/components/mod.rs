mod alert;
mod bridge_actions;
mod command;
mod delay;
mod sound;
mod webhook;
mod write_file;

pub use alert::{AlertAction, AlertActionConfig};
pub use bridge_actions::{
    ChatMessageAction, ChatMessageConfig, CustomAction, CustomConfig, EmojiRainAction,
    EmojiRainConfig, ObsSceneAction, ObsSceneConfig, OscSendAction, OscSendConfig, VrLayoutAction,
    VrLayoutConfig, VrMuteGuestAction, VrMuteGuestConfig,
};
pub use command::{CommandAction, CommandConfig};
pub use delay::{DelayAction, DelayConfig};
pub use sound::{SoundAction, SoundConfig};
pub use webhook::{WebhookAction, WebhookConfig};
pub use write_file::{WriteFileAction, WriteFileConfig};

use crate::engine::condition::to_number;
use crate::engine::{factory, ActionFactory};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 内置动作类型及其别名
pub fn builtin_factories() -> Vec<(&'static str, ActionFactory)> {
    let alert = factory(AlertAction::new);
    let sound = factory(SoundAction::new);
    let webhook = factory(WebhookAction::new);
    let write_file = factory(WriteFileAction::new);
    let delay = factory(DelayAction::new);
    let command = factory(CommandAction::new);
    let obs = factory(ObsSceneAction::new);
    let chat = factory(ChatMessageAction::new);
    let osc = factory(OscSendAction::new);

    vec![
        ("alert", alert.clone()),
        ("show_alert", alert),
        ("sound", sound.clone()),
        ("play_sound", sound),
        ("webhook", webhook.clone()),
        ("http_request", webhook),
        ("write_file", write_file.clone()),
        ("log_to_file", write_file),
        ("delay", delay.clone()),
        ("wait", delay),
        ("command", command.clone()),
        ("run_command", command),
        ("obs_scene", obs.clone()),
        ("switch_scene", obs),
        ("chat_message", chat.clone()),
        ("send_chat", chat),
        ("osc_send", osc.clone()),
        ("osc_trigger", osc),
        ("vr_mute_guest", factory(VrMuteGuestAction::new)),
        ("vr_layout", factory(VrLayoutAction::new)),
        ("emoji_rain", factory(EmojiRainAction::new)),
        ("custom", factory(CustomAction::new)),
    ]
}

/// 数值参数兼容字符串写法,无法解析时视为未设置
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let n = to_number(Some(&v));
        (n.is_finite() && n >= 0.0).then(|| n as u64)
    }))
}
