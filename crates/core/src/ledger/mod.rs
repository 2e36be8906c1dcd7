//! Completion ledger for resumable batches.
//!
//! The ledger is the persisted set of files that have already been re-encoded
//! successfully, in this run or an earlier one. Workers consult it before
//! touching a file and append to it after a successful conversion, so an
//! interrupted batch can be restarted without redoing finished work.
//!
//! The whole sequence is rewritten as a JSON array on every new entry. That
//! write is not atomic: a crash mid-write can lose the file, in which case the
//! next run starts from an empty ledger.

mod error;
mod store;

pub use error::LedgerError;
pub use store::CompletionLedger;
