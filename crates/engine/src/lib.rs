//! Core engine for Gruzzolo: credential store, per-user ledger, recurring
//! transaction materialization and balance reporting over a SQLite database.
//!
//! The UI in `crates/app` only ever talks to [`Engine`]; it never touches
//! the tables directly.

pub use categories::Category;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, LedgerTotals};
pub use recurrence_rules::{Frequency, RecurrenceRule};
pub use session::{Identity, Session};
pub use transactions::{Transaction, TransactionKind, balance};

mod auth;
mod categories;
mod error;
mod money;
mod ops;
mod recurrence_rules;
mod session;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
