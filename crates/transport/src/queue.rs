//! Queue endpoints used by the remote market client and server.

use crate::error::TransportError;

/// Sending half of a queue. Implementations must be shareable across threads.
pub trait Publisher: Send + Sync {
    fn publish(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Send to a named queue. Transports without routing ignore the name.
    fn publish_to(&self, queue: &str, data: &[u8]) -> Result<(), TransportError> {
        let _ = queue;
        self.publish(data)
    }

    fn flush(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// Receiving half of a queue.
pub trait Subscriber: Send + Sync {
    /// Hand every queued message to `handler` without blocking and return
    /// how many were delivered.
    fn poll(&self, handler: &mut dyn FnMut(&[u8])) -> Result<usize, TransportError>;

    /// Whether a message is waiting. Transports that cannot tell say yes.
    fn has_messages(&self) -> bool {
        true
    }
}

pub type BoxPublisher = Box<dyn Publisher>;
pub type BoxSubscriber = Box<dyn Subscriber>;

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&self, data: &[u8]) -> Result<(), TransportError> {
        P::publish(self, data)
    }

    fn publish_to(&self, queue: &str, data: &[u8]) -> Result<(), TransportError> {
        P::publish_to(self, queue, data)
    }

    fn flush(&self) -> Result<(), TransportError> {
        P::flush(self)
    }

    fn is_active(&self) -> bool {
        P::is_active(self)
    }
}

impl<S: Subscriber + ?Sized> Subscriber for Box<S> {
    fn poll(&self, handler: &mut dyn FnMut(&[u8])) -> Result<usize, TransportError> {
        S::poll(self, handler)
    }

    fn has_messages(&self) -> bool {
        S::has_messages(self)
    }
}
