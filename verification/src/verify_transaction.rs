use std::ops;
use ser::Serializable;
use chain::IndexedTransaction;
use constants::{MAX_BLOCK_SIZE, MAX_COINBASE_SIZE, MAX_MONEY, MIN_COINBASE_SIZE};
use error::TransactionError;

/// Context-free checks of a single transaction.
pub struct TransactionVerifier<'a> {
	pub empty: TransactionEmpty<'a>,
	pub null_non_coinbase: TransactionNullNonCoinbase<'a>,
	pub oversized_coinbase: TransactionOversizedCoinbase<'a>,
	pub size: TransactionAbsoluteSize<'a>,
	pub output_values: TransactionOutputValues<'a>,
}

impl<'a> TransactionVerifier<'a> {
	pub fn new(transaction: &'a IndexedTransaction) -> Self {
		trace!(target: "verification", "Tx pre-verification {}", transaction.hash.to_reversed_str());
		TransactionVerifier {
			empty: TransactionEmpty::new(transaction),
			null_non_coinbase: TransactionNullNonCoinbase::new(transaction),
			oversized_coinbase: TransactionOversizedCoinbase::new(transaction, MIN_COINBASE_SIZE..MAX_COINBASE_SIZE),
			size: TransactionAbsoluteSize::new(transaction),
			output_values: TransactionOutputValues::new(transaction),
		}
	}

	pub fn check(&self) -> Result<(), TransactionError> {
		self.empty.check()?;
		self.null_non_coinbase.check()?;
		self.oversized_coinbase.check()?;
		self.size.check()?;
		self.output_values.check()?;
		Ok(())
	}
}

pub struct TransactionEmpty<'a> {
	transaction: &'a IndexedTransaction,
}

impl<'a> TransactionEmpty<'a> {
	fn new(transaction: &'a IndexedTransaction) -> Self {
		TransactionEmpty {
			transaction: transaction,
		}
	}

	fn check(&self) -> Result<(), TransactionError> {
		if self.transaction.raw.is_empty() {
			Err(TransactionError::Empty)
		} else {
			Ok(())
		}
	}
}

pub struct TransactionNullNonCoinbase<'a> {
	transaction: &'a IndexedTransaction,
}

impl<'a> TransactionNullNonCoinbase<'a> {
	fn new(transaction: &'a IndexedTransaction) -> Self {
		TransactionNullNonCoinbase {
			transaction: transaction,
		}
	}

	fn check(&self) -> Result<(), TransactionError> {
		if !self.transaction.raw.is_coinbase() && self.transaction.raw.is_null() {
			Err(TransactionError::NullNonCoinbase)
		} else {
			Ok(())
		}
	}
}

pub struct TransactionOversizedCoinbase<'a> {
	transaction: &'a IndexedTransaction,
	size_range: ops::Range<usize>,
}

impl<'a> TransactionOversizedCoinbase<'a> {
	fn new(transaction: &'a IndexedTransaction, size_range: ops::Range<usize>) -> Self {
		TransactionOversizedCoinbase {
			transaction: transaction,
			size_range: size_range,
		}
	}

	fn check(&self) -> Result<(), TransactionError> {
		if self.transaction.raw.is_coinbase() {
			let script_len = self.transaction.raw.inputs[0].script_sig.len();
			if script_len < self.size_range.start || script_len > self.size_range.end {
				return Err(TransactionError::CoinbaseSignatureLength(script_len));
			}
		}

		Ok(())
	}
}

pub struct TransactionAbsoluteSize<'a> {
	transaction: &'a IndexedTransaction,
}

impl<'a> TransactionAbsoluteSize<'a> {
	fn new(transaction: &'a IndexedTransaction) -> Self {
		TransactionAbsoluteSize {
			transaction: transaction,
		}
	}

	fn check(&self) -> Result<(), TransactionError> {
		let size = self.transaction.raw.serialized_size();
		if size > MAX_BLOCK_SIZE {
			Err(TransactionError::MaxSize)
		} else {
			Ok(())
		}
	}
}

pub struct TransactionOutputValues<'a> {
	transaction: &'a IndexedTransaction,
}

impl<'a> TransactionOutputValues<'a> {
	fn new(transaction: &'a IndexedTransaction) -> Self {
		TransactionOutputValues {
			transaction: transaction,
		}
	}

	fn check(&self) -> Result<(), TransactionError> {
		let mut total = 0u64;
		for output in &self.transaction.raw.outputs {
			if output.value > MAX_MONEY {
				return Err(TransactionError::OutputValueOverflow);
			}

			total = match total.checked_add(output.value) {
				Some(total) if total <= MAX_MONEY => total,
				_ => return Err(TransactionError::OutputValueOverflow),
			};
		}

		Ok(())
	}
}
