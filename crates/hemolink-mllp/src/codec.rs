//! MLLP帧编解码
//!
//! 帧格式：0x0B <payload> 0x1C 0x0D，payload为UTF-8文本。
//! 解码器在BytesMut上跨read缓冲，读边界落在帧中间或多字节
//! UTF-8序列中间都不会丢帧；payload非法UTF-8按解码错误上报，
//! 不会panic。

use bytes::{Buf, BytesMut};
use hemolink_core::HemolinkError;
use tokio_util::codec::Decoder;

/// 帧起始标记
pub const START_BLOCK: u8 = 0x0b;
/// 帧结束标记第一字节
pub const END_BLOCK: u8 = 0x1c;
/// 帧结束标记第二字节
pub const CARRIAGE_RETURN: u8 = 0x0d;

/// 给payload加MLLP帧标记
pub fn frame_payload(payload: &str) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + 3);
    framed.push(START_BLOCK);
    framed.extend_from_slice(payload.as_bytes());
    framed.push(END_BLOCK);
    framed.push(CARRIAGE_RETURN);
    framed
}

/// 默认单帧上限：HL7消息远小于此值，超出视为对端异常
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// MLLP解码器
#[derive(Debug)]
pub struct MllpCodec {
    max_frame_len: usize,
}

impl Default for MllpCodec {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl MllpCodec {
    /// 创建指定单帧上限的解码器
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }
}

impl Decoder for MllpCodec {
    type Item = String;
    type Error = HemolinkError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, HemolinkError> {
        // 起始标记之前的杂散字节直接丢弃
        let Some(start) = src.iter().position(|&b| b == START_BLOCK) else {
            src.clear();
            return Ok(None);
        };
        if start > 0 {
            src.advance(start);
        }

        // 在payload里找 0x1C 0x0D 结束对；没找到说明帧未收全
        let Some(end) = src[1..]
            .windows(2)
            .position(|pair| pair == [END_BLOCK, CARRIAGE_RETURN])
        else {
            // 迟迟等不到结束对的帧不能让缓冲无限增长
            if src.len() > self.max_frame_len {
                let dropped = src.len();
                src.clear();
                return Err(HemolinkError::FrameDecode(format!(
                    "帧超过上限{}字节仍未结束，已丢弃{}字节",
                    self.max_frame_len, dropped
                )));
            }
            return Ok(None);
        };

        // 起始标记 + payload + 结束对；坏帧也要先消费掉
        let frame = src.split_to(end + 3);
        let payload = &frame[1..frame.len() - 2];

        match std::str::from_utf8(payload) {
            Ok(text) => Ok(Some(text.to_string())),
            Err(e) => Err(HemolinkError::FrameDecode(format!(
                "帧payload不是合法UTF-8: {e}"
            ))),
        }
    }
}
