//! Facebook UID Extractor.
//!
//! 从 Facebook 链接中识别数字 ID 或用户名，提供 HTML 表单与 JSON API。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/UID 提取
//! - `ui::web`：axum 路由、页面模板与服务启动

use anyhow::{Context, Result};
use clap::Parser;

mod base_system;
mod ui;

use base_system::config::load_or_create_with_base;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "fb-uid-extractor")]
#[command(about = "Extract Facebook UIDs from links (web form + JSON API)")]
struct Cli {
    /// 启用调试日志输出（覆盖配置文件中的 debug）
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 监听地址，多个用逗号分隔（覆盖 FB_UID_ADDR 与配置文件）
    #[arg(long)]
    bind: Option<String>,

    /// 数据目录路径（用于存放 config.yml 和 logs）
    #[arg(long)]
    data_dir: Option<String>,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("fb-uid-extractor v{}", VERSION);
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref().map(std::path::Path::new);

    let mut config = load_config(data_dir)?;
    config.debug |= cli.debug;

    let log = init_logging(&config, data_dir)?;
    info!(target: "startup", "v{} starting, logs in {}", VERSION, log.logs_dir().display());

    ui::web::run(&config, cli.bind)
}

fn load_config(data_dir: Option<&std::path::Path>) -> Result<Config> {
    load_or_create_with_base::<Config>(None, data_dir).context("load config")
}

fn init_logging(config: &Config, base_dir: Option<&std::path::Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug: config.debug,
        archive_on_exit: config.archive_logs_on_exit,
    };
    LogSystem::init_with_base(opts, base_dir).context("init logging")
}
