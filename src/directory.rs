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

//! Account directory.
//!
//! Owns the accounts of every registered user and enforces per-user name
//! uniqueness (case-sensitive, exact match). Uniqueness uses the map entry
//! API for an atomic check-and-insert, so two racing `open_account` calls
//! with the same name cannot both succeed.

use crate::account::Account;
use crate::base::{AccountId, UserId};
use crate::error::LedgerError;
use crate::notify::Notifier;
use crate::user::UserRoster;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store of accounts, indexed by id, owner, and per-user name.
pub struct AccountDirectory {
    roster: Arc<UserRoster>,
    accounts: DashMap<AccountId, Arc<Account>>,
    /// Per-user name index; presence means the name is taken.
    names: DashMap<(UserId, String), AccountId>,
    by_user: DashMap<UserId, Vec<AccountId>>,
    next_id: AtomicU64,
    notifier: Arc<dyn Notifier>,
}

impl AccountDirectory {
    pub fn new(roster: Arc<UserRoster>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            roster,
            accounts: DashMap::new(),
            names: DashMap::new(),
            by_user: DashMap::new(),
            next_id: AtomicU64::new(1),
            notifier,
        }
    }

    /// Lists the accounts owned by a user.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UserNotFound`] if the user is not registered.
    pub fn list_accounts(&self, user_id: UserId) -> Result<Vec<Arc<Account>>, LedgerError> {
        if !self.roster.contains(user_id) {
            return Err(LedgerError::UserNotFound);
        }
        let ids = self
            .by_user
            .get(&user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.accounts.get(id).map(|a| Arc::clone(&a)))
            .collect())
    }

    /// Opens a new account for a user with the given opening balance.
    ///
    /// On success emits a fire-and-forget "new account opened" notification;
    /// delivery is outside the atomic guarantee.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] if the user is not registered.
    /// - [`LedgerError::DuplicateName`] if the user already owns an account
    ///   with this exact name.
    /// - [`LedgerError::InvalidBalance`] if the opening balance is negative.
    pub fn open_account(
        &self,
        user_id: UserId,
        name: &str,
        initial_balance: Decimal,
    ) -> Result<Arc<Account>, LedgerError> {
        let user = self.roster.find(user_id).ok_or(LedgerError::UserNotFound)?;
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::InvalidBalance);
        }

        match self.names.entry((user_id, name.to_owned())) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateName),
            Entry::Vacant(entry) => {
                let id = AccountId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let account = Arc::new(Account::new(id, user_id, name, initial_balance));
                self.accounts.insert(id, Arc::clone(&account));
                self.by_user.entry(user_id).or_default().push(id);
                entry.insert(id);

                self.notifier.notify(
                    &user,
                    &format!("account {name} opened with initial balance {initial_balance}"),
                );
                Ok(account)
            }
        }
    }

    /// Retrieves an account by id.
    ///
    /// Returns `None` if absent; callers decide whether absence is fatal.
    pub fn find_account(&self, id: AccountId) -> Option<Arc<Account>> {
        self.accounts.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Returns every account in the directory, in arbitrary order.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        self.accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Account ids owned by a user, without a roster check. Used by the
    /// deletion sequence, which must work on partially-removed users.
    pub(crate) fn user_account_ids(&self, user_id: UserId) -> Vec<AccountId> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Removes every account owned by a user. One step of the explicit
    /// cascade; idempotent, returns the number of accounts removed.
    pub fn remove_user_accounts(&self, user_id: UserId) -> usize {
        let ids = self
            .by_user
            .remove(&user_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();
        let mut removed = 0;
        for id in &ids {
            if let Some((_, account)) = self.accounts.remove(id) {
                self.names.remove(&(user_id, account.name().to_owned()));
                removed += 1;
            }
        }
        removed
    }
}
