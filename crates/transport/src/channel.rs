//! In-process queues backed by bounded crossbeam channels.
//!
//! Used when the market server runs on a thread of the same process.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};

use crate::error::TransportError;
use crate::queue::{Publisher, Subscriber};

#[derive(Clone)]
pub struct ChannelPublisher {
    sender: Sender<Vec<u8>>,
}

impl ChannelPublisher {
    pub fn new(sender: Sender<Vec<u8>>) -> Self {
        Self { sender }
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, data: &[u8]) -> Result<(), TransportError> {
        self.sender.try_send(data.to_vec()).map_err(|err| match err {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Disconnected(_) => TransportError::ChannelClosed,
        })
    }
}

pub struct ChannelSubscriber {
    receiver: Receiver<Vec<u8>>,
}

impl ChannelSubscriber {
    pub fn new(receiver: Receiver<Vec<u8>>) -> Self {
        Self { receiver }
    }
}

impl Subscriber for ChannelSubscriber {
    /// A closed queue still yields what was sent before the sender left;
    /// `ChannelClosed` is reported only once it is drained.
    fn poll(&self, handler: &mut dyn FnMut(&[u8])) -> Result<usize, TransportError> {
        let mut delivered = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    handler(&message);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break Ok(delivered),
                Err(TryRecvError::Disconnected) if delivered == 0 => {
                    break Err(TransportError::ChannelClosed);
                }
                Err(TryRecvError::Disconnected) => break Ok(delivered),
            }
        }
    }

    fn has_messages(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// Connected endpoints of one bounded queue holding at most `capacity`
/// undelivered messages.
pub fn channel_pair(capacity: usize) -> (ChannelPublisher, ChannelSubscriber) {
    let (sender, receiver) = bounded(capacity);
    (ChannelPublisher::new(sender), ChannelSubscriber::new(receiver))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(subscriber: &ChannelSubscriber) -> Vec<Vec<u8>> {
        let mut seen = Vec::new();
        subscriber.poll(&mut |data| seen.push(data.to_vec())).unwrap();
        seen
    }

    #[test]
    fn requests_arrive_in_publish_order() {
        let (requests, inbox) = channel_pair(8);
        for day in 0..3u8 {
            requests.publish(&[day]).unwrap();
        }

        assert!(inbox.has_messages());
        assert_eq!(drain(&inbox), vec![vec![0], vec![1], vec![2]]);
        assert!(!inbox.has_messages());
        assert!(drain(&inbox).is_empty());
    }

    #[test]
    fn cloned_publishers_share_one_queue() {
        let (simulation, inbox) = channel_pair(4);
        let shutdown = simulation.clone();

        simulation.publish(b"day").unwrap();
        shutdown.publish(b"end").unwrap();

        assert_eq!(drain(&inbox), vec![b"day".to_vec(), b"end".to_vec()]);
    }

    #[test]
    fn full_queue_pushes_back() {
        let (requests, _inbox) = channel_pair(1);
        requests.publish(b"first").unwrap();

        assert_eq!(requests.publish(b"second"), Err(TransportError::Full));
    }

    #[test]
    fn dropped_reader_closes_the_queue() {
        let (requests, inbox) = channel_pair(4);
        drop(inbox);

        assert_eq!(requests.publish(b"late"), Err(TransportError::ChannelClosed));
    }

    #[test]
    fn backlog_is_delivered_before_hangup() {
        let (replies, outbox) = channel_pair(4);
        replies.publish(b"99.5").unwrap();
        drop(replies);

        assert_eq!(drain(&outbox), vec![b"99.5".to_vec()]);
        assert_eq!(
            outbox.poll(&mut |_| {}),
            Err(TransportError::ChannelClosed)
        );
    }
}
