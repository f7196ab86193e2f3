//! Script handling required by block validation.
//!
//! The script interpreter itself is an external collaborator, exposed here
//! only through the `ScriptVerifier` oracle trait. What this crate does own
//! is the structural side of consensus: signature operation counting,
//! standard output patterns and the builder used for the coinbase height
//! prefix.

#[macro_use]
extern crate bitflags;

extern crate chain;
extern crate primitives;

mod builder;
mod flags;
mod opcode;
mod script;
mod verify;

pub use builder::Builder;
pub use flags::VerificationFlags;
pub use opcode::{OP_0, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4, OP_1, OP_16,
	OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_RETURN,
	OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_CHECKMULTISIG, OP_CHECKMULTISIGVERIFY};
pub use script::{Script, Instruction, Instructions, ScriptAddress, script_hash_sigops_count};
pub use verify::{ScriptVerifier, AcceptingScriptVerifier, RejectingScriptVerifier};
