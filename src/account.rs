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

//! Account balances and the per-account transaction boundary.
//!
//! The balance is the only mutable shared resource in the subsystem. It is
//! guarded by a per-account mutex held for the whole commit unit, so two
//! concurrent commits against the same account serialize, while commits
//! against different accounts never contend.
//!
//! # Example
//!
//! ```
//! use cost_ledger_rs::{Account, AccountId, UserId};
//! use rust_decimal_macros::dec;
//!
//! let account = Account::new(AccountId(1), UserId(1), "wallet", dec!(100.00));
//! assert_eq!(account.balance(), dec!(100.00));
//! ```

use crate::base::{AccountId, UserId};
use crate::error::LedgerError;
use crate::operation::Operation;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::sync::Arc;

#[derive(Debug)]
struct BalanceData {
    balance: Decimal,
}

impl BalanceData {
    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
    }
}

/// A user's account: immutable identity plus a mutex-guarded balance.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    user_id: UserId,
    name: String,
    inner: Mutex<BalanceData>,
}

impl Account {
    const DECIMAL_PRECISION: u32 = 2;

    /// Creates an account with the given opening balance.
    ///
    /// The directory validates the balance before construction; this
    /// constructor is also the seam tests use to build accounts directly.
    pub fn new(id: AccountId, user_id: UserId, name: &str, balance: Decimal) -> Self {
        Self {
            id,
            user_id,
            name: name.to_owned(),
            inner: Mutex::new(BalanceData { balance }),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current balance.
    ///
    /// Takes the account lock only for the read, so the value may be stale
    /// relative to an in-flight commit, but it is never torn.
    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    /// Atomically overwrites the stored balance.
    ///
    /// Low-level primitive: it enforces non-negativity and nothing else.
    /// Validating the overwrite against the operation being recorded is the
    /// coordinator's job.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidBalance`] if `new_balance` is negative; the
    /// stored balance is untouched.
    pub fn set_balance(&self, new_balance: Decimal) -> Result<(), LedgerError> {
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::InvalidBalance);
        }
        let mut data = self.inner.lock();
        data.balance = new_balance;
        data.assert_invariants();
        Ok(())
    }

    /// Runs one commit unit against this account: check, overwrite, append.
    ///
    /// The account lock is held across the whole closure, so no other
    /// thread can observe the new balance without the matching journal
    /// entry, and two concurrent commits cannot both read the pre-update
    /// balance.
    ///
    /// If `append` fails after the balance was overwritten, the previous
    /// balance is restored before the lock is released: either both halves
    /// of the unit apply or neither does.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientFunds`] if `balance + delta` is
    ///   negative; nothing is mutated.
    /// - Any error returned by `append`, after the balance rollback.
    pub(crate) fn commit<F>(&self, delta: Decimal, append: F) -> Result<Arc<Operation>, LedgerError>
    where
        F: FnOnce() -> Result<Arc<Operation>, LedgerError>,
    {
        let mut data = self.inner.lock();
        let candidate = data.balance + delta;
        if candidate < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }

        let previous = data.balance;
        data.balance = candidate;
        data.assert_invariants();

        match append() {
            Ok(operation) => Ok(operation),
            Err(e) => {
                // Second half of the unit failed: undo the first half.
                data.balance = previous;
                Err(e)
            }
        }
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("user", &self.user_id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field(
            "balance",
            &data.balance.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.end()
    }
}
