use storage::Error as DBError;

/// All possible verification and chain errors.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
	/// The block is already stored (or queued in the orphan pool).
	Duplicate,
	/// Referenced entity is missing.
	NotFound,
	/// The outpoint has no recorded spend.
	UnspentOutput,
	/// A stop was requested; the current operation was abandoned.
	ServiceStopped,
	/// Block has no transactions or exceeds the maximum serialized size.
	SizeLimits,
	/// Block hash does not satisfy the claimed bits.
	Pow,
	/// Block timestamp is too far in the future.
	FuturisticTimestamp,
	/// First transaction is not a coinbase.
	FirstNotCoinbase,
	/// A transaction beyond the first is a coinbase.
	ExtraCoinbases,
	/// One of the transactions is invalid.
	Transaction(usize, TransactionError),
	/// Block hash does not match the checkpoint for its height.
	CheckpointsFailed,
	/// Block version is below the enforced minimum.
	OldVersionBlock,
	/// Coinbase input script does not start with the serialized height.
	CoinbaseHeightMismatch,
	/// Claimed bits do not match the required work.
	IncorrectProofOfWork,
	/// Block timestamp is not past the median time of its ancestors.
	TimestampTooEarly,
	/// A transaction is not final at the block's height and time.
	NonFinalTransaction,
	/// Signature operation count exceeds the block maximum.
	TooManySigops,
	/// Header merkle root does not match the transactions.
	MerkleMismatch,
	/// A transaction duplicates an existing, fully spent transaction.
	DuplicateOrSpent,
	/// An input failed to connect against its previous output.
	ValidateInputsFailed,
	/// Transaction fees are negative or exceed the currency cap.
	FeesOutOfRange,
	/// Coinbase claims more than subsidy plus fees.
	CoinbaseTooLarge,
	/// Database error.
	Database(DBError),
}

impl From<DBError> for Error {
	fn from(err: DBError) -> Self {
		Error::Database(err)
	}
}

/// Context-free transaction verification errors.
#[derive(Debug, PartialEq, Clone)]
pub enum TransactionError {
	/// Transaction has no inputs or no outputs.
	Empty,
	/// Transaction is not a coinbase but has null inputs.
	NullNonCoinbase,
	/// Coinbase input script size is out of the 2..=100 range.
	CoinbaseSignatureLength(usize),
	/// Transaction is larger than a block.
	MaxSize,
	/// An output value, or the sum of output values, exceeds the cap.
	OutputValueOverflow,
}
