//! MLLP监听服务
//!
//! 每个入站连接一个独立任务，连接内顺序执行
//! 解帧 → 归档 → 解码 → 规则评估 → 工单渲染 → 发布。
//! 连接之间除告警序号计数器和归档文件外没有共享可变状态。

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use hemolink_alerting::{render_ticket, AlertEngine, AlertSink};
use hemolink_core::Result;
use hemolink_hl7::{ack, Hl7Decoder, Hl7Document};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Decoder as _;
use tracing::{debug, error, info, warn};

use crate::archive::MessageArchive;
use crate::codec::{frame_payload, MllpCodec};

/// MLLP监听配置
#[derive(Debug, Clone)]
pub struct MllpServerConfig {
    /// 监听地址
    pub bind_host: String,
    /// 监听端口
    pub port: u16,
    /// 原始消息归档目录
    pub archive_dir: String,
    /// 处理完一帧后是否回发MLLP封装的HL7 ACK
    pub send_ack: bool,
    /// 空闲读超时；None表示无限等待
    pub read_timeout: Option<Duration>,
}

impl Default for MllpServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 2575,
            archive_dir: "./data/messages".to_string(),
            send_ack: false,
            read_timeout: None,
        }
    }
}

/// MLLP监听服务
pub struct MllpServer {
    config: MllpServerConfig,
    decoder: Hl7Decoder,
    engine: Arc<AlertEngine>,
    archive: Arc<MessageArchive>,
    sink: Arc<dyn AlertSink>,
}

impl MllpServer {
    /// 创建监听服务
    pub async fn new(
        config: MllpServerConfig,
        engine: Arc<AlertEngine>,
        sink: Arc<dyn AlertSink>,
    ) -> Result<Self> {
        let archive = Arc::new(MessageArchive::new(&config.archive_dir).await?);
        Ok(Self {
            config,
            decoder: Hl7Decoder::new(),
            engine,
            archive,
            sink,
        })
    }

    /// 绑定监听端口，返回实际地址（端口0时由系统分配）
    pub async fn bind(&self) -> Result<(TcpListener, SocketAddr)> {
        let addr = format!("{}:{}", self.config.bind_host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        Ok((listener, local_addr))
    }

    /// 启动监听；只有端口绑定失败会返回错误
    pub async fn start(&self) -> Result<()> {
        let (listener, addr) = self.bind().await?;
        info!("MLLP监听已启动: {}，等待HL7消息", addr);
        self.serve(listener).await
    }

    /// accept循环：每个连接spawn一个处理任务
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, remote_addr)) => {
                    info!("接受连接: {}", remote_addr);
                    let context = self.connection_context();
                    tokio::spawn(async move {
                        if let Err(e) = context.run(stream, remote_addr).await {
                            error!("连接{}处理失败: {}", remote_addr, e);
                        }
                    });
                }
                Err(e) => {
                    // accept失败只记日志，监听循环继续
                    error!("接受连接失败: {}", e);
                }
            }
        }
    }

    fn connection_context(&self) -> ConnectionContext {
        ConnectionContext {
            decoder: self.decoder.clone(),
            engine: Arc::clone(&self.engine),
            archive: Arc::clone(&self.archive),
            sink: Arc::clone(&self.sink),
            send_ack: self.config.send_ack,
            read_timeout: self.config.read_timeout,
        }
    }
}

/// 单个连接的处理上下文
struct ConnectionContext {
    decoder: Hl7Decoder,
    engine: Arc<AlertEngine>,
    archive: Arc<MessageArchive>,
    sink: Arc<dyn AlertSink>,
    send_ack: bool,
    read_timeout: Option<Duration>,
}

impl ConnectionContext {
    /// 连接主循环：阻塞读字节流，跨read重组MLLP帧
    async fn run(self, mut stream: TcpStream, remote_addr: SocketAddr) -> Result<()> {
        let mut codec = MllpCodec::default();
        let mut buffer = BytesMut::with_capacity(4096);
        let mut chunk = [0u8; 4096];

        loop {
            let read = match self.read_timeout {
                Some(timeout) => {
                    match tokio::time::timeout(timeout, stream.read(&mut chunk)).await {
                        Ok(read) => read,
                        Err(_) => {
                            warn!("连接{}空闲超时，关闭", remote_addr);
                            return Ok(());
                        }
                    }
                }
                None => stream.read(&mut chunk).await,
            };

            match read {
                Ok(0) => {
                    debug!("对端关闭连接: {}", remote_addr);
                    return Ok(());
                }
                Ok(n) => {
                    buffer.extend_from_slice(&chunk[..n]);
                    self.drain_frames(&mut codec, &mut buffer, &mut stream).await;
                }
                Err(e) => {
                    error!("连接{}读取失败: {}", remote_addr, e);
                    return Err(e.into());
                }
            }
        }
    }

    /// 把缓冲里已收全的帧依次送入流水线
    ///
    /// 坏帧只影响自身：记日志后继续解下一帧，连接不中断。
    async fn drain_frames(
        &self,
        codec: &mut MllpCodec,
        buffer: &mut BytesMut,
        stream: &mut TcpStream,
    ) {
        loop {
            match codec.decode(buffer) {
                Ok(Some(raw)) => match self.process_frame(&raw).await {
                    Ok(document) => {
                        if self.send_ack {
                            let control_id = document.control_id().unwrap_or("");
                            self.write_ack(stream, ack::build_ack(control_id, true, None))
                                .await;
                        }
                    }
                    Err(e) => {
                        error!("消息处理失败: {}", e);
                        if self.send_ack {
                            self.write_ack(
                                stream,
                                ack::build_ack("", false, Some(&e.to_string())),
                            )
                            .await;
                        }
                    }
                },
                Ok(None) => break,
                Err(e) => warn!("帧解码失败: {}", e),
            }
        }
    }

    /// 单帧流水线：归档 → 解码 → 评估 → 渲染 → 发布
    async fn process_frame(&self, raw: &str) -> Result<Hl7Document> {
        self.archive.append_raw(raw).await?;

        let document = self.decoder.decode(raw)?;
        let alerts = self.engine.evaluate(raw, &document);
        if alerts.is_empty() {
            debug!("消息未触发告警");
        }

        for alert in &alerts {
            let ticket = render_ticket(alert)?;
            self.sink.publish(alert, &ticket).await?;
        }

        Ok(document)
    }

    /// 回发MLLP封装的ACK；发送失败不影响后续帧
    async fn write_ack(&self, stream: &mut TcpStream, ack_text: String) {
        if let Err(e) = stream.write_all(&frame_payload(&ack_text)).await {
            warn!("ACK发送失败: {}", e);
        }
    }
}
