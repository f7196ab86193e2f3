//! Blockchain engine: accepts blocks of a Bitcoin-compatible chain and
//! maintains a persisted, verified ledger.
//!
//! `BlockChain` is the public entry point. Writes are funnelled through a
//! single FIFO write strand; reads run a seqlock protocol against the
//! strand and never block it. Candidate blocks pass through the orphan
//! pool and the organizer, which decides the best chain and reorganizes
//! when a candidate chain carries more work.

#[macro_use]
extern crate log;
extern crate fs2;
extern crate parking_lot;
extern crate time;

extern crate chain;
extern crate db;
extern crate network;
extern crate primitives;
extern crate script;
extern crate storage;
extern crate verification;

mod block_chain;
mod block_detail;
mod orphan_pool;
mod organizer;

#[cfg(test)]
mod test_chain;

pub use primitives::{hash, bytes};

pub use block_chain::{BlockChain, WriteCompletion};
pub use block_detail::{BlockInfo, BlockStatus};
pub use organizer::{Organizer, ReorganizationEvent, ReorganizeHandler};
pub use orphan_pool::OrphanPool;
pub use verification::{Error, StopSignal};
