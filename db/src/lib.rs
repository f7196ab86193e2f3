//! Persistence for the chain engine.
//!
//! The unspent-output index is a memory-mapped open-addressing hash table
//! (`UtxoDatabase` over `RecordTable` over `RecordAllocator` over
//! `MemoryMappedFile`). Sibling indexes (blocks, transactions, history,
//! stealth) are columnar in-memory maps aggregated by `BlockChainDatabase`.

#[macro_use]
extern crate log;
extern crate byteorder;
extern crate memmap2;
extern crate parking_lot;

extern crate bitcrypto as crypto;
extern crate chain;
extern crate primitives;
extern crate script;
extern crate storage;

mod block_chain_db;
mod error;
mod memory_map;
mod record_allocator;
mod record_table;
mod utxo;

pub use primitives::{hash, bytes};

pub use block_chain_db::BlockChainDatabase;
pub use error::Error;
pub use memory_map::MemoryMappedFile;
pub use record_allocator::RecordAllocator;
pub use record_table::{RecordTable, EMPTY_RECORD_INDEX};
pub use utxo::{UtxoDatabase, UTXO_NUMBER_BUCKETS};
