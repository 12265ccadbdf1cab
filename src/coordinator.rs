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

//! Ledger transaction coordinator.
//!
//! The [`LedgerCoordinator`] is the sole entrypoint that mutates a balance
//! and appends a journal entry, as one logically atomic unit. Each
//! invocation terminates in one of two states:
//!
//! - **Committed**: the balance is updated and the journal entry exists.
//! - **Rejected**: no observable change anywhere.
//!
//! There is no partially-applied state visible to any other thread: the
//! balance overwrite and the journal append both happen while the account
//! lock is held (see [`Account`]).
//!
//! # Retries
//!
//! Business-rule rejections (`AccountNotFound`, `InsufficientFunds`, ...)
//! are terminal and never retried. A transient [`LedgerError::Conflict`]
//! from the journal is retried a bounded number of times, then surfaced so
//! callers can distinguish "your request is invalid" from "try again".

use crate::account::Account;
use crate::base::{AccountId, CategoryId, OperationId, UserId};
use crate::directory::AccountDirectory;
use crate::error::LedgerError;
use crate::journal::OperationJournal;
use crate::notify::Notifier;
use crate::operation::Operation;
use crate::registry::CategoryRegistry;
use crate::summary::OperationView;
use crate::user::UserRoster;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Upper bound on transparent retries of transient store conflicts.
const MAX_CONFLICT_RETRIES: usize = 3;

/// Orchestrates balance mutation and journal append over injected stores.
pub struct LedgerCoordinator {
    roster: Arc<UserRoster>,
    directory: Arc<AccountDirectory>,
    registry: Arc<CategoryRegistry>,
    journal: Arc<OperationJournal>,
}

impl LedgerCoordinator {
    pub fn new(
        roster: Arc<UserRoster>,
        directory: Arc<AccountDirectory>,
        registry: Arc<CategoryRegistry>,
        journal: Arc<OperationJournal>,
    ) -> Self {
        Self {
            roster,
            directory,
            registry,
            journal,
        }
    }

    /// Builds a coordinator over a fresh set of in-memory stores wired to
    /// the given notifier.
    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Self {
        let roster = Arc::new(UserRoster::new(Arc::clone(&notifier)));
        let directory = Arc::new(AccountDirectory::new(Arc::clone(&roster), notifier));
        let registry = Arc::new(CategoryRegistry::new(Arc::clone(&roster)));
        let journal = Arc::new(OperationJournal::new());
        Self::new(roster, directory, registry, journal)
    }

    pub fn roster(&self) -> &Arc<UserRoster> {
        &self.roster
    }

    pub fn directory(&self) -> &Arc<AccountDirectory> {
        &self.directory
    }

    pub fn registry(&self) -> &Arc<CategoryRegistry> {
        &self.registry
    }

    pub fn journal(&self) -> &Arc<OperationJournal> {
        &self.journal
    }

    /// Records an operation dated today.
    ///
    /// Steps, executed as one atomic unit:
    ///
    /// 1. Resolve the account and category.
    /// 2. Derive the signed delta from the category kind.
    /// 3. Reject if the candidate balance would be negative.
    /// 4. Overwrite the balance and append the journal entry under the
    ///    account lock; roll the balance back if the append fails.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] / [`LedgerError::CategoryNotFound`]
    /// - [`LedgerError::InvalidAmount`] if `amount` is zero or negative.
    /// - [`LedgerError::InsufficientFunds`] if the operation would drive the
    ///   balance negative; no balance mutation, no journal entry.
    /// - [`LedgerError::Conflict`] if transient store conflicts persisted
    ///   through all retries.
    pub fn record_operation(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        amount: Decimal,
    ) -> Result<Arc<Operation>, LedgerError> {
        self.commit_operation(account_id, category_id, amount, Local::now().date_naive())
    }

    /// Records an operation with a caller-supplied historical date.
    ///
    /// This is the bulk-load path for seeding and backfill. It runs the
    /// same atomic unit as [`record_operation`](Self::record_operation) —
    /// same validation, same balance effect — differing only in the date.
    /// Operations are immutable once committed; there is no post-commit
    /// date correction.
    pub fn backfill_operation(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Arc<Operation>, LedgerError> {
        self.commit_operation(account_id, category_id, amount, date)
    }

    fn commit_operation(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Arc<Operation>, LedgerError> {
        let account = self
            .directory
            .find_account(account_id)
            .ok_or(LedgerError::AccountNotFound)?;
        let category = self
            .registry
            .find_category(category_id)
            .ok_or(LedgerError::CategoryNotFound)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let delta = category.kind.signed(amount);

        let mut attempts = 0;
        loop {
            let result = account.commit(delta, || {
                self.journal.append(account_id, category_id, amount, date)
            });
            match result {
                Err(LedgerError::Conflict) if attempts < MAX_CONFLICT_RETRIES => {
                    attempts += 1;
                }
                other => return other,
            }
        }
    }

    /// Retrieves a committed operation by id.
    ///
    /// # Errors
    ///
    /// [`LedgerError::OperationNotFound`] if no operation with this id was
    /// ever committed (or its account has since been deleted).
    pub fn operation(&self, id: OperationId) -> Result<Arc<Operation>, LedgerError> {
        self.journal.find(id).ok_or(LedgerError::OperationNotFound)
    }

    /// All operations recorded against any of the user's accounts, in
    /// arbitrary order.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UserNotFound`] if the user is not registered.
    pub fn operations_for_user(&self, user_id: UserId) -> Result<Vec<Arc<Operation>>, LedgerError> {
        let accounts = self.directory.list_accounts(user_id)?;
        Ok(accounts
            .iter()
            .flat_map(|account| self.journal.find_by_account(account.id()))
            .collect())
    }

    /// Joins operations with their category kinds for aggregation.
    ///
    /// # Errors
    ///
    /// [`LedgerError::CategoryNotFound`] if any operation references a
    /// category that no longer exists; aggregation requires every category
    /// to be resolvable.
    pub fn resolve(
        &self,
        operations: &[Arc<Operation>],
    ) -> Result<Vec<OperationView>, LedgerError> {
        operations
            .iter()
            .map(|operation| {
                let category = self
                    .registry
                    .find_category(operation.category_id)
                    .ok_or(LedgerError::CategoryNotFound)?;
                Ok(OperationView {
                    amount: operation.amount,
                    kind: category.kind,
                    date: operation.date,
                })
            })
            .collect()
    }

    /// Deletes a user and everything it owns, as an explicit sequence:
    /// journal entries per account, then accounts, then categories, then
    /// the user record. Every step is idempotent, so the sequence can be
    /// re-run after a partial failure.
    ///
    /// Returns `true` if the user record existed.
    pub fn delete_user(&self, user_id: UserId) -> bool {
        for account_id in self.directory.user_account_ids(user_id) {
            self.journal.purge_account(account_id);
        }
        self.directory.remove_user_accounts(user_id);
        self.registry.remove_user_categories(user_id);
        self.roster.remove(user_id)
    }
}
