/// Where a stored block ended up.
///
/// The status is monotone: a block enters as an orphan and is either
/// confirmed onto the main chain or rejected with an error.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BlockStatus {
	/// Queued in the orphan pool, waiting for its parent or for work.
	Orphan,
	/// Connected to the main chain.
	Confirmed,
	/// Failed validation and was dropped.
	Rejected,
}

/// Outcome of a store operation.
#[derive(Debug, PartialEq, Clone)]
pub struct BlockInfo {
	pub status: BlockStatus,
	/// Height on the main chain; meaningful only for confirmed blocks.
	pub height: Option<u32>,
}

impl BlockInfo {
	pub fn orphan() -> Self {
		BlockInfo {
			status: BlockStatus::Orphan,
			height: None,
		}
	}

	pub fn confirmed(height: u32) -> Self {
		BlockInfo {
			status: BlockStatus::Confirmed,
			height: Some(height),
		}
	}
}
