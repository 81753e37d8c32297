use super::types::ChainEvent;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<UnboundedSender<ChainEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<ChainEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn emit(&mut self, event: ChainEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::SegmentId;

    #[test]
    fn every_subscriber_receives_each_event() {
        let mut bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(ChainEvent::Merged { value: 8 });
        bus.emit(ChainEvent::HeadChanged {
            head: Some(SegmentId(1)),
        });

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.try_recv().ok(), Some(ChainEvent::Merged { value: 8 }));
            assert_eq!(
                rx.try_recv().ok(),
                Some(ChainEvent::HeadChanged {
                    head: Some(SegmentId(1))
                })
            );
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);
        bus.emit(ChainEvent::Absorbed { value: 4 });
        assert_eq!(bus.subscriber_count(), 1);
        drop(kept);
    }
}
