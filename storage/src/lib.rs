extern crate primitives;
extern crate chain;

mod best_block;
mod block_provider;
mod block_ref;
mod error;
mod history;
mod input_point;
mod store;
mod transaction_provider;
mod utxo_provider;

pub use primitives::{hash, bytes};

pub use best_block::BestBlock;
pub use block_provider::{BlockHeaderProvider, BlockProvider};
pub use block_ref::BlockRef;
pub use error::Error;
pub use history::{HistoryKind, HistoryProvider, HistoryRow, StealthPrefix, StealthProvider, StealthRow};
pub use input_point::InputPoint;
pub use store::{AsSubstore, SharedStore, Store};
pub use transaction_provider::{TransactionIndex, TransactionProvider};
pub use utxo_provider::{UtxoProvider, UtxoStatInfo};
