//! Serialized script, used inside transaction inputs and outputs.

use std::{fmt, ops};
use primitives::bytes::Bytes;
use primitives::hash::H160;
use opcode::{self, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4};

/// Maximum number of public keys per multisig.
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// Address referenced by a standard output script.
#[derive(Debug, PartialEq, Clone)]
pub enum ScriptAddress {
	/// Pay to public key hash.
	PublicKeyHash(H160),
	/// Pay to script hash.
	ScriptHash(H160),
}

impl ScriptAddress {
	pub fn hash(&self) -> &H160 {
		match *self {
			ScriptAddress::PublicKeyHash(ref hash) => hash,
			ScriptAddress::ScriptHash(ref hash) => hash,
		}
	}
}

/// Serialized script, used inside transaction inputs and outputs.
#[derive(PartialEq, Default, Clone)]
pub struct Script {
	data: Bytes,
}

impl From<&'static str> for Script {
	fn from(s: &'static str) -> Self {
		Script::new(s.into())
	}
}

impl From<Bytes> for Script {
	fn from(s: Bytes) -> Self {
		Script::new(s)
	}
}

impl From<Vec<u8>> for Script {
	fn from(v: Vec<u8>) -> Self {
		Script::new(v.into())
	}
}

impl From<Script> for Bytes {
	fn from(script: Script) -> Self {
		script.data
	}
}

impl Script {
	/// Script constructor.
	pub fn new(data: Bytes) -> Self {
		Script {
			data: data,
		}
	}

	pub fn to_bytes(&self) -> Bytes {
		self.data.clone()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Extra-fast test for pay-to-script-hash scripts.
	pub fn is_pay_to_script_hash(&self) -> bool {
		self.data.len() == 23 &&
			self.data[0] == opcode::OP_HASH160 &&
			self.data[1] == 0x14 &&
			self.data[22] == opcode::OP_EQUAL
	}

	/// Extra-fast test for pay-to-public-key-hash scripts.
	pub fn is_pay_to_public_key_hash(&self) -> bool {
		self.data.len() == 25 &&
			self.data[0] == opcode::OP_DUP &&
			self.data[1] == opcode::OP_HASH160 &&
			self.data[2] == 0x14 &&
			self.data[23] == opcode::OP_EQUALVERIFY &&
			self.data[24] == opcode::OP_CHECKSIG
	}

	/// Is this a provably unspendable data-carrier output?
	pub fn is_null_data_script(&self) -> bool {
		!self.data.is_empty() && self.data[0] == opcode::OP_RETURN
	}

	/// Address of a standard output script, if the script is standard.
	pub fn extract_address(&self) -> Option<ScriptAddress> {
		if self.is_pay_to_public_key_hash() {
			let mut hash = H160::default();
			hash.copy_from_slice(&self.data[3..23]);
			Some(ScriptAddress::PublicKeyHash(hash))
		} else if self.is_pay_to_script_hash() {
			let mut hash = H160::default();
			hash.copy_from_slice(&self.data[2..22]);
			Some(ScriptAddress::ScriptHash(hash))
		} else {
			None
		}
	}

	pub fn iter(&self) -> Instructions {
		Instructions {
			data: &self.data,
			position: 0,
		}
	}

	/// Count the legacy signature operations of the script.
	///
	/// When `accurate` is false, every CHECKMULTISIG counts for 20 keys,
	/// matching the historical block-level accounting.
	pub fn sigops_count(&self, accurate: bool) -> usize {
		let mut last_opcode = 0xffu8;
		let mut total = 0;
		for instruction in self.iter() {
			let instruction = match instruction {
				Ok(instruction) => instruction,
				// stop counting at the first parse error, sigops before it
				// still count
				Err(()) => break,
			};

			match instruction.opcode {
				opcode::OP_CHECKSIG | opcode::OP_CHECKSIGVERIFY => {
					total += 1;
				},
				opcode::OP_CHECKMULTISIG | opcode::OP_CHECKMULTISIGVERIFY => {
					if accurate && opcode::is_within_op_n(last_opcode) {
						total += opcode::decode_op_n(last_opcode) as usize;
					} else {
						total += MAX_PUBKEYS_PER_MULTISIG;
					}
				},
				_ => (),
			}

			last_opcode = instruction.opcode;
		}

		total
	}
}

/// Signature operations of the P2SH redeem script carried by the input.
///
/// Returns zero unless the spent output is pay-to-script-hash; the redeem
/// script is the final push of the input script, counted accurately.
pub fn script_hash_sigops_count(output_script: &Script, input_script: &Script) -> usize {
	if !output_script.is_pay_to_script_hash() {
		return 0;
	}

	let last_push = match input_script.iter().filter_map(|i| i.ok()).last() {
		Some(instruction) => match instruction.data {
			Some(data) => data.to_vec(),
			None => return 0,
		},
		None => return 0,
	};

	Script::new(last_push.into()).sigops_count(true)
}

/// Single parsed script instruction.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Instruction<'a> {
	pub opcode: u8,
	pub data: Option<&'a [u8]>,
}

/// Iterator over script instructions.
pub struct Instructions<'a> {
	data: &'a [u8],
	position: usize,
}

impl<'a> Iterator for Instructions<'a> {
	type Item = Result<Instruction<'a>, ()>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.position >= self.data.len() {
			return None;
		}

		let opcode = self.data[self.position];
		self.position += 1;

		let data_len = match opcode {
			x if x < OP_PUSHDATA1 => x as usize,
			OP_PUSHDATA1 => {
				match self.read_le(1) {
					Some(len) => len,
					None => return Some(Err(())),
				}
			},
			OP_PUSHDATA2 => {
				match self.read_le(2) {
					Some(len) => len,
					None => return Some(Err(())),
				}
			},
			OP_PUSHDATA4 => {
				match self.read_le(4) {
					Some(len) => len,
					None => return Some(Err(())),
				}
			},
			_ => {
				return Some(Ok(Instruction {
					opcode: opcode,
					data: None,
				}));
			},
		};

		if self.position + data_len > self.data.len() {
			self.position = self.data.len();
			return Some(Err(()));
		}

		let data = &self.data[self.position..self.position + data_len];
		self.position += data_len;

		Some(Ok(Instruction {
			opcode: opcode,
			data: Some(data),
		}))
	}
}

impl<'a> Instructions<'a> {
	fn read_le(&mut self, bytes: usize) -> Option<usize> {
		if self.position + bytes > self.data.len() {
			self.position = self.data.len();
			return None;
		}

		let mut result = 0usize;
		for i in 0..bytes {
			result |= (self.data[self.position + i] as usize) << (8 * i);
		}
		self.position += bytes;
		Some(result)
	}
}

impl ops::Deref for Script {
	type Target = [u8];

	fn deref(&self) -> &Self::Target {
		&self.data
	}
}

impl fmt::Debug for Script {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&self.data, f)
	}
}

#[cfg(test)]
mod tests {
	use builder::Builder;
	use opcode;
	use super::{Script, ScriptAddress, script_hash_sigops_count};

	#[test]
	fn test_is_pay_to_script_hash() {
		let script: Script = "a9143b80842f4ea32806ce5e723a255ddd6490cfd28d87".into();
		let script2: Script = "a9143b80842f4ea32806ce5e723a255ddd6490cfd28d88".into();
		assert!(script.is_pay_to_script_hash());
		assert!(!script2.is_pay_to_script_hash());
	}

	#[test]
	fn test_extract_address_p2pkh() {
		let script: Script = "76a914404371705fa9bd789a2fcd52d2c580b65d35549d88ac".into();
		let address = "404371705fa9bd789a2fcd52d2c580b65d35549d".into();
		assert_eq!(script.extract_address(), Some(ScriptAddress::PublicKeyHash(address)));
	}

	#[test]
	fn test_sigops_count() {
		// one sig, then data push
		let script: Script = "76a914aab76ba4877d696590d94ea3e02948b55294815188ac".into();
		assert_eq!(script.sigops_count(false), 1);

		let multisig: Script = Builder::default()
			.push_opcode(opcode::OP_1 + 1)
			.push_opcode(opcode::OP_CHECKMULTISIG)
			.into_script();
		assert_eq!(multisig.sigops_count(true), 2);
		assert_eq!(multisig.sigops_count(false), 20);
	}

	#[test]
	fn test_sigops_count_b73() {
		// maximum push of 520 bytes followed by a checkmultisig
		let max_block_sigops = 20000;
		let block_sigops = 0;
		let mut script = vec![opcode::OP_CHECKSIG; max_block_sigops - block_sigops + 1];
		script[max_block_sigops - block_sigops] = opcode::OP_CHECKMULTISIG;
		let script: Script = script.into();
		assert!(script.sigops_count(false) > max_block_sigops);
	}

	#[test]
	fn test_script_hash_sigops_count() {
		// p2sh output, input pushing a redeem script with two checksigs
		let redeem = Builder::default()
			.push_opcode(opcode::OP_CHECKSIG)
			.push_opcode(opcode::OP_CHECKSIG)
			.into_script();
		let input_script = Builder::default()
			.push_data(&redeem)
			.into_script();
		let output_script: Script = "a9143b80842f4ea32806ce5e723a255ddd6490cfd28d87".into();

		assert_eq!(script_hash_sigops_count(&output_script, &input_script), 2);
		// non-p2sh previous output counts for nothing
		let plain: Script = "76a914404371705fa9bd789a2fcd52d2c580b65d35549d88ac".into();
		assert_eq!(script_hash_sigops_count(&plain, &input_script), 0);
	}
}
