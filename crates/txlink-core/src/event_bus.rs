//! Broadcast channel for execution progress.
//!
//! The executor publishes a [`ProgressEvent`] for every phase change,
//! submitted and confirmed transaction, and failed run. Any number of
//! observers (the CLI progress printer, tests) subscribe independently.

use tokio::sync::broadcast;
use txlink_types::ProgressEvent;

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of progress events. Clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<ProgressEvent>,
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

impl EventBus {
	/// Slow subscribers lose the oldest events once `capacity` is exceeded.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Receives every event published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
		self.sender.subscribe()
	}

	/// Sends `event` to current subscribers and returns how many got it.
	///
	/// Progress is fire-and-forget: with nobody listening the event is
	/// dropped and 0 is returned.
	pub fn publish(&self, event: ProgressEvent) -> usize {
		self.sender.send(event).unwrap_or(0)
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::sync::broadcast::error::RecvError;
	use txlink_types::{ActionKind, ExecutionPhase, B256};

	fn phase_change(to: ExecutionPhase) -> ProgressEvent {
		ProgressEvent::PhaseChanged {
			from: ExecutionPhase::Idle,
			to,
		}
	}

	#[tokio::test]
	async fn test_every_subscriber_sees_submission() {
		let bus = EventBus::default();
		let mut printer = bus.subscribe();
		let mut recorder = bus.subscribe();

		let submitted = ProgressEvent::TransactionSubmitted {
			action: ActionKind::Approve,
			tx_hash: B256::repeat_byte(0x12),
		};
		assert_eq!(bus.publish(submitted.clone()), 2);

		assert_eq!(printer.recv().await.unwrap(), submitted);
		assert_eq!(recorder.recv().await.unwrap(), submitted);
	}

	#[test]
	fn test_unobserved_events_are_dropped() {
		let bus = EventBus::default();
		assert_eq!(bus.subscriber_count(), 0);
		assert_eq!(bus.publish(phase_change(ExecutionPhase::Switching)), 0);
	}

	#[tokio::test]
	async fn test_late_subscriber_misses_earlier_events() {
		let bus = EventBus::default();
		let mut early = bus.subscribe();
		bus.publish(phase_change(ExecutionPhase::Switching));

		let mut late = bus.clone().subscribe();
		bus.publish(phase_change(ExecutionPhase::Signing));

		assert_eq!(
			early.recv().await.unwrap(),
			phase_change(ExecutionPhase::Switching)
		);
		assert_eq!(late.recv().await.unwrap(), phase_change(ExecutionPhase::Signing));
	}

	#[tokio::test]
	async fn test_slow_subscriber_lags() {
		let bus = EventBus::new(2);
		let mut slow = bus.subscribe();
		for phase in [
			ExecutionPhase::Switching,
			ExecutionPhase::Approving,
			ExecutionPhase::Approved,
		] {
			bus.publish(phase_change(phase));
		}

		assert!(matches!(slow.recv().await, Err(RecvError::Lagged(1))));
		assert_eq!(
			slow.recv().await.unwrap(),
			phase_change(ExecutionPhase::Approving)
		);
	}
}
