//! 消息总线核心实现

use shared::message::RealtimeEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default capacity of the broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 消息总线 - 全局广播，无持久化
///
/// 订阅者随时加入或离开；与订阅同时发生的发布可能送达也可能错过新订阅者，
/// 由客户端的定时轮询兜底。
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<RealtimeEvent>,
    /// 关闭信号令牌 (WebSocket 连接监听此令牌退出)
    shutdown_token: CancellationToken,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布事件 (fire-and-forget)
    ///
    /// 不等待投递；没有订阅者时只记录 debug 日志。返回收到事件的订阅者数量。
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = %kind, receivers, "Event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(event = %kind, "Event dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers (connected viewers)
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 通知所有连接关闭
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AttentionReason;

    fn waiter_called(table: i64) -> RealtimeEvent {
        RealtimeEvent::WaiterCalled {
            table_number: table,
            reason: AttentionReason::Payment,
            timestamp: 1,
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = MessageBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(waiter_called(7)), 2);
        assert_eq!(a.recv().await.unwrap().table_id(), Some(7));
        assert_eq!(b.recv().await.unwrap().table_id(), Some(7));
    }

    #[test]
    fn test_publish_without_subscribers_does_not_fail() {
        let bus = MessageBus::new();
        assert_eq!(bus.publish(waiter_called(1)), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_no_replay() {
        let bus = MessageBus::new();
        let _early = bus.subscribe();
        bus.publish(waiter_called(1));

        let mut late = bus.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let bus = MessageBus::with_capacity(2);
        let mut rx = bus.subscribe();
        for t in 1..=4 {
            bus.publish(waiter_called(t));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
    }

    #[test]
    fn test_shutdown_cancels_token() {
        let bus = MessageBus::new();
        let token = bus.shutdown_token().clone();
        bus.shutdown();
        assert!(token.is_cancelled());
    }
}
