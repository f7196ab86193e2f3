//! Script builder.

use primitives::bytes::Bytes;
use opcode::{OP_0, OP_PUSHDATA1, OP_PUSHDATA2, OP_1};
use script::Script;

/// Script builder.
#[derive(Default)]
pub struct Builder {
	data: Bytes,
}

impl Builder {
	/// Builds p2sh script.
	pub fn build_p2sh(address_hash: &[u8; 20]) -> Script {
		Builder::default()
			.push_opcode(::opcode::OP_HASH160)
			.push_data(address_hash)
			.push_opcode(::opcode::OP_EQUAL)
			.into_script()
	}

	/// Appends an opcode to the end of the script.
	pub fn push_opcode(mut self, opcode: u8) -> Self {
		self.data.push(opcode);
		self
	}

	/// Appends the minimally-encoded push of a number, as used for the
	/// coinbase height prefix.
	pub fn push_num(self, num: i64) -> Self {
		self.push_data(&script_number(num))
	}

	/// Appends a data push to the end of the script.
	pub fn push_data(mut self, data: &[u8]) -> Self {
		let len = data.len();
		if len == 0 {
			self.data.push(OP_0);
		} else if len == 1 && data[0] >= 1 && data[0] <= 16 {
			self.data.push(OP_1 + data[0] - 1);
		} else if len < OP_PUSHDATA1 as usize {
			self.data.push(len as u8);
			self.data.extend_from_slice(data);
		} else if len <= 0xff {
			self.data.push(OP_PUSHDATA1);
			self.data.push(len as u8);
			self.data.extend_from_slice(data);
		} else if len <= 0xffff {
			self.data.push(OP_PUSHDATA2);
			self.data.push((len & 0xff) as u8);
			self.data.push(((len >> 8) & 0xff) as u8);
			self.data.extend_from_slice(data);
		} else {
			self.data.push(::opcode::OP_PUSHDATA4);
			self.data.push((len & 0xff) as u8);
			self.data.push(((len >> 8) & 0xff) as u8);
			self.data.push(((len >> 16) & 0xff) as u8);
			self.data.push(((len >> 24) & 0xff) as u8);
			self.data.extend_from_slice(data);
		}
		self
	}

	pub fn into_script(self) -> Script {
		Script::new(self.data)
	}

	pub fn into_bytes(self) -> Bytes {
		self.data
	}
}

/// Minimal little-endian encoding of a script number with a sign bit.
fn script_number(num: i64) -> Vec<u8> {
	if num == 0 {
		return Vec::new();
	}

	let negative = num < 0;
	let mut abs = num.checked_abs().expect("script numbers are far from i64::MIN; qed") as u64;

	let mut result = Vec::new();
	while abs > 0 {
		result.push((abs & 0xff) as u8);
		abs >>= 8;
	}

	// the most significant byte carries the sign bit; add an extra byte if
	// the value already uses it
	if result[result.len() - 1] & 0x80 != 0 {
		result.push(if negative { 0x80 } else { 0x00 });
	} else if negative {
		let len = result.len();
		result[len - 1] |= 0x80;
	}

	result
}

#[cfg(test)]
mod tests {
	use super::{Builder, script_number};

	#[test]
	fn test_script_number_encoding() {
		assert_eq!(script_number(0), Vec::<u8>::new());
		assert_eq!(script_number(1), vec![0x01]);
		assert_eq!(script_number(-1), vec![0x81]);
		assert_eq!(script_number(0x80), vec![0x80, 0x00]);
		assert_eq!(script_number(173805), vec![0x6d, 0xa6, 0x02]);
	}

	#[test]
	fn test_push_num_opcodes() {
		// 1..16 use the short form
		let script = Builder::default().push_num(7).into_script();
		assert_eq!(&*script, &[0x51 + 6][..]);

		let script = Builder::default().push_num(17).into_script();
		assert_eq!(&*script, &[0x01, 17][..]);
	}
}
