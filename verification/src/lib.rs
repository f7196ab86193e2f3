//! Block consensus verification.
//!
//! Full block verification consists of three stages:
//! - `BlockVerifier` — context-free checks, runnable on orphans;
//! - `BlockAcceptor` — contextual checks needing the block height and the
//!   headers preceding it;
//! - `BlockConnector` — per-input connection against the unspent-output
//!   index and the candidate (orphan) chain.
//!
//! The organizer runs the three stages in order for every candidate block.
//! Headers and transactions below the fork point resolve from the store,
//! above it from the candidate chain, through `ForkChainView`.

#[macro_use]
extern crate log;
extern crate rayon;

extern crate chain;
extern crate network;
extern crate primitives;
extern crate script;
extern crate serialization as ser;
extern crate storage;

pub mod constants;
mod accept_block;
mod connect_block;
mod deployments;
mod error;
mod fork_view;
mod sigops;
mod stop;
mod verify_block;
mod verify_transaction;
mod work;

#[cfg(test)]
mod tests;

pub use primitives::{bigint, hash, compact};

pub use accept_block::BlockAcceptor;
pub use connect_block::BlockConnector;
pub use deployments::BlockDeployments;
pub use error::{Error, TransactionError};
pub use fork_view::{ForkChainView, ForkStore};
pub use sigops::transaction_sigops;
pub use stop::StopSignal;
pub use verify_block::BlockVerifier;
pub use verify_transaction::TransactionVerifier;
pub use work::{block_reward_satoshi, block_work, is_valid_proof_of_work,
	is_valid_proof_of_work_hash, work_required};
