//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 服务配置
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // 日志配置
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_true")]
    pub archive_logs_on_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            debug: default_false(),
            archive_logs_on_exit: default_true(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 3] = [
            FieldMeta {
                name: "bind_addr",
                description: "Web 服务监听地址，多个地址用逗号分隔，例如 0.0.0.0:5000,[::]:5000",
            },
            FieldMeta {
                name: "debug",
                description: "是否输出调试日志",
            },
            FieldMeta {
                name: "archive_logs_on_exit",
                description: "退出时是否将 logs/latest.log 打包为 zip",
            },
        ];
        &FIELDS
    }

    fn validate(&self) -> Result<(), String> {
        if self.bind_addr.trim().is_empty() {
            return Err("bind_addr must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_false() -> bool {
    false
}

fn default_true() -> bool {
    true
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}
