use crate::engine::ActionHandler;
use crate::types::{ActionContext, ActionDescriptor, FlowError};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WriteFileConfig {
    /// 用户提供的路径,只有文件名部分会被使用
    #[serde(alias = "path", alias = "filename")]
    pub file_path: String,
    #[serde(alias = "text")]
    pub content: String,
    /// 追加写入,默认开启
    pub append: bool,
}

impl Default for WriteFileConfig {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            content: String::new(),
            append: true,
        }
    }
}

#[derive(Debug)]
pub struct WriteFileAction {
    config: WriteFileConfig,
}

impl WriteFileAction {
    pub fn new(config: WriteFileConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for WriteFileAction {
    async fn handle(&self, ctx: &ActionContext<'_>) -> Result<(), FlowError> {
        let guard = &ctx.services.path_guard;
        let target = guard.resolve(&self.config.file_path)?;

        tokio::fs::create_dir_all(guard.safe_dir()).await?;

        let mut content = ctx.render(&self.config.content);
        let mut options = tokio::fs::OpenOptions::new();
        options.create(true);
        if self.config.append {
            // 每条记录一行
            content.push('\n');
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let mut file = options.open(&target).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        info!("写入文件: {}", target.display());
        Ok(())
    }

    fn get_descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            type_name: "write_file".to_string(),
            name: "写入文件".to_string(),
            description: "将渲染后的内容写入安全目录下的文件".to_string(),
            requires_bridge: false,
        }
    }
}
