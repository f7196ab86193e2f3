use chain::Transaction;
use script::Script;

/// Legacy signature operation count of the transaction: input and output
/// scripts counted inaccurately (every multisig is twenty keys).
pub fn transaction_sigops(transaction: &Transaction) -> usize {
	let input_sigops: usize = transaction.inputs.iter()
		.map(|input| Script::new(input.script_sig.clone()).sigops_count(false))
		.sum();
	let output_sigops: usize = transaction.outputs.iter()
		.map(|output| Script::new(output.script_pubkey.clone()).sigops_count(false))
		.sum();
	input_sigops + output_sigops
}

#[cfg(test)]
mod tests {
	use chain::Transaction;
	use super::transaction_sigops;

	#[test]
	fn test_transaction_sigops() {
		// single p2pkh output: one CHECKSIG
		let tx: Transaction = "0100000001a6b97044d03da79c005b20ea9c0e1a6d9dc12d9f7b91a5911c9030a439eed8f5000000004948304502206e21798a42fae0e854281abd38bacd1aeed3ee3738d9e1446618c4571d1090db022100e2ac980643b0b82c0e88ffdfec6b64e3e6ba35e7ba5fdd7d5d6cc8d25c6b241501ffffffff0100f2052a010000001976a914404371705fa9bd789a2fcd52d2c580b65d35549d88ac00000000".into();
		assert_eq!(transaction_sigops(&tx), 1);
	}
}
