// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # Cost Ledger
//!
//! This library provides the ledger consistency subsystem of a personal
//! cost tracker: accounts, income/expense categories, and the monetary
//! operations recorded against them. Mutating a balance and appending the
//! matching journal entry happen as one atomic unit under concurrent
//! access, with a hard non-negative-balance invariant.
//!
//! ## Core Components
//!
//! - [`LedgerCoordinator`]: the sole transactional entrypoint
//! - [`AccountDirectory`] / [`CategoryRegistry`]: per-user stores with name
//!   uniqueness
//! - [`OperationJournal`]: append-only history with date and owner lookups
//! - [`summary`]: stateless aggregation over resolved operations
//!
//! ## Example
//!
//! ```
//! use cost_ledger_rs::{CategoryKind, LedgerCoordinator, NoopNotifier};
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let ledger = LedgerCoordinator::in_memory(Arc::new(NoopNotifier));
//! let user = ledger.roster().register("alice", "alice@example.com");
//! let account = ledger
//!     .directory()
//!     .open_account(user.id, "wallet", dec!(1000.00))
//!     .unwrap();
//! let salary = ledger
//!     .registry()
//!     .define(user.id, "salary", CategoryKind::Income)
//!     .unwrap();
//!
//! ledger
//!     .record_operation(account.id(), salary.id, dec!(500.00))
//!     .unwrap();
//! assert_eq!(account.balance(), dec!(1500.00));
//! ```
//!
//! ## Thread Safety
//!
//! Commits against the same account serialize on a per-account lock; a
//! journal entry is never visible without its balance effect and vice
//! versa. Commits against different accounts proceed in parallel, and
//! read paths never block writers for longer than a single lock handoff.

pub mod account;
mod base;
pub mod category;
mod coordinator;
pub mod directory;
pub mod error;
mod journal;
mod middleware;
pub mod notify;
mod operation;
pub mod registry;
pub mod summary;
pub mod user;

pub use account::Account;
pub use base::{AccountId, CategoryId, OperationId, UserId};
pub use category::{Category, CategoryKind};
pub use coordinator::LedgerCoordinator;
pub use directory::AccountDirectory;
pub use error::LedgerError;
pub use journal::OperationJournal;
pub use middleware::Logged;
pub use notify::{LogNotifier, Notifier, NoopNotifier, PendingNotification, QueueNotifier};
pub use operation::Operation;
pub use registry::CategoryRegistry;
pub use summary::{OperationView, Summary};
pub use user::{User, UserRoster};
