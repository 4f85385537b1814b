//! Event fan-out from the orchestrator to a presentation layer.

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use quorum_core::events::SessionEvent;

/// Unbounded, never-blocking event sender.
///
/// The orchestrator is the sole producer and never blocks on a consumer:
/// sends are unbounded, and a dropped receiver is silently ignored.
#[derive(Clone, Debug)]
pub struct EventEmitter {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl EventEmitter {
    /// Create an emitter and the stream a presentation layer consumes.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiverStream<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, UnboundedReceiverStream::new(receiver))
    }

    /// Emit one event. A closed receiver is ignored.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (emitter, mut stream) = EventEmitter::channel();
        emitter.emit(SessionEvent::system("one"));
        emitter.emit(SessionEvent::system("two"));
        drop(emitter);

        let events: Vec<_> = (&mut stream).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].content, "one");
        assert_eq!(events[1].content, "two");
    }

    #[tokio::test]
    async fn emit_after_receiver_drop_is_silent() {
        let (emitter, stream) = EventEmitter::channel();
        drop(stream);
        // Must not panic or block
        emitter.emit(SessionEvent::system("into the void"));
    }
}
