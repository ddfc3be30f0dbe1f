pub mod demo;
pub mod idempotency;
pub mod ledger;
pub mod settlement;

pub use demo::seed_demo_transactions;
pub use idempotency::{IdempotencyService, IdempotencyStatus};
pub use ledger::LedgerService;
pub use settlement::{SettleOutcome, SettlementWorker};
