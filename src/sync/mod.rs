//! Background feed synchronisation: a [`Scheduler`] that picks stale feeds on
//! every tick and a [`FeedWorker`] that runs one feed's cycle.

pub use self::scheduler::Scheduler;
pub use self::worker::FeedWorker;

use crate::feed::FeedId;

mod scheduler;
mod worker;

/// How one feed's cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
	Synced {
		inserted: usize,
		skipped: usize,
		failed: usize,
	},
	MarkFailed(String),
	FetchFailed(String),
	ParseFailed(String),
	/// The worker task panicked or was cancelled.
	Aborted(String),
}

impl FeedOutcome {
	#[must_use]
	pub fn is_synced(&self) -> bool {
		matches!(self, Self::Synced { .. })
	}
}

/// Per-feed outcomes of a single tick, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
	pub outcomes: Vec<(FeedId, FeedOutcome)>,
}

impl BatchReport {
	#[must_use]
	pub fn outcome(&self, feed_id: FeedId) -> Option<&FeedOutcome> {
		self.outcomes
			.iter()
			.find(|(id, _)| *id == feed_id)
			.map(|(_, outcome)| outcome)
	}

	#[must_use]
	pub fn inserted(&self) -> usize {
		self.outcomes
			.iter()
			.map(|(_, outcome)| match outcome {
				FeedOutcome::Synced { inserted, .. } => *inserted,
				_ => 0,
			})
			.sum()
	}

	#[must_use]
	pub fn failed(&self) -> usize {
		self.outcomes.iter().filter(|(_, o)| !o.is_synced()).count()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.outcomes.is_empty()
	}
}
