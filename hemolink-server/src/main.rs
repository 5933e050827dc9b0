//! Hemolink网关主程序
//!
//! 监听MLLP端口，把透析机HL7消息解码、评估并输出告警与工单。

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hemolink_alerting::{AlertEngine, AlertSink, FileAlertSink};
use hemolink_core::Result;
use hemolink_mllp::{MllpServer, MllpServerConfig};
use tracing::{error, info};

mod config;
use config::GatewayConfig;

/// 网关命令行参数
#[derive(Parser, Debug)]
#[command(name = "hemolink-server")]
#[command(about = "HL7/MLLP透析告警网关")]
struct Args {
    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 监听地址
    #[arg(short, long)]
    bind: Option<String>,

    /// 归档目录
    #[arg(short, long)]
    archive_dir: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 处理完一帧后回发MLLP ACK
    #[arg(long)]
    send_ack: bool,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.as_str())
        .init();

    info!("启动Hemolink网关...");

    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path).await?,
        None => GatewayConfig::default(),
    };

    // 命令行参数优先于配置文件
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_host = bind;
    }
    if let Some(dir) = args.archive_dir {
        config.archive_dir = dir;
    }
    if args.send_ack {
        config.send_ack = true;
    }

    info!("网关配置:");
    info!("  监听地址: {}:{}", config.bind_host, config.port);
    info!("  归档目录: {}", config.archive_dir);
    info!("  回发ACK: {}", config.send_ack);

    let server_config = MllpServerConfig {
        bind_host: config.bind_host.clone(),
        port: config.port,
        archive_dir: config.archive_dir.clone(),
        send_ack: config.send_ack,
        read_timeout: (config.read_timeout_secs > 0)
            .then(|| Duration::from_secs(config.read_timeout_secs)),
    };

    let engine = Arc::new(AlertEngine::new());
    let sink: Arc<dyn AlertSink> = Arc::new(FileAlertSink::new(&config.archive_dir));
    let server = MllpServer::new(server_config, engine, sink).await?;

    // 只有端口绑定失败是致命的；连接级错误在各自任务里消化
    if let Err(e) = server.start().await {
        error!("网关启动失败: {}", e);
        return Err(e);
    }

    Ok(())
}
