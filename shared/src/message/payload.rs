//! 连接控制帧
//!
//! 与业务事件共用 `event` 标签，由 WebSocket 端点在连接层产生，不经过消息总线。

use serde::{Deserialize, Serialize};

use super::RealtimeEvent;

/// 连接层帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlFrame {
    /// 连接建立后的第一帧，告知客户端兜底轮询间隔
    Ready { poll_interval_secs: u64 },
    /// 订阅方落后、事件已丢失，客户端应立即全量刷新
    Resync {},
}

/// 推送给订阅方的任意一帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    Control(ControlFrame),
    Event(RealtimeEvent),
}

impl From<RealtimeEvent> for OutboundFrame {
    fn from(event: RealtimeEvent) -> Self {
        Self::Event(event)
    }
}

impl From<ControlFrame> for OutboundFrame {
    fn from(frame: ControlFrame) -> Self {
        Self::Control(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_frames_wire_shape() {
        let ready = serde_json::to_string(&ControlFrame::Ready {
            poll_interval_secs: 30,
        })
        .unwrap();
        assert_eq!(ready, r#"{"event":"ready","pollIntervalSecs":30}"#);

        let resync = serde_json::to_string(&ControlFrame::Resync {}).unwrap();
        assert_eq!(resync, r#"{"event":"resync"}"#);
    }

    #[test]
    fn outbound_frame_is_transparent() {
        let frame: OutboundFrame = RealtimeEvent::OrderCreated {
            table_id: 1,
            order_id: 2,
        }
        .into();
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["event"], "orderCreated");
        assert_eq!(value["tableId"], 1);
    }
}
