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

//! Logging middleware for the coordinator.
//!
//! Cross-cutting logging is composed explicitly by the caller as a
//! decorator over the coordinator's mutating entrypoints, not woven in.
//! Wrap when you want the logs, pass the bare coordinator when you don't.

use crate::base::{AccountId, CategoryId, UserId};
use crate::coordinator::LedgerCoordinator;
use crate::error::LedgerError;
use crate::operation::Operation;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

/// Decorator emitting a tracing event per mutating call, with outcome and
/// elapsed time. Read paths are reachable through [`Logged::inner`].
pub struct Logged {
    inner: Arc<LedgerCoordinator>,
}

impl Logged {
    pub fn new(inner: Arc<LedgerCoordinator>) -> Self {
        Self { inner }
    }

    /// The undecorated coordinator, for read paths and store access.
    pub fn inner(&self) -> &LedgerCoordinator {
        &self.inner
    }

    /// See [`LedgerCoordinator::record_operation`].
    pub fn record_operation(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        amount: Decimal,
    ) -> Result<Arc<Operation>, LedgerError> {
        let started = Instant::now();
        let result = self.inner.record_operation(account_id, category_id, amount);
        Self::log_outcome("record_operation", account_id, started, &result);
        result
    }

    /// See [`LedgerCoordinator::backfill_operation`].
    pub fn backfill_operation(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Arc<Operation>, LedgerError> {
        let started = Instant::now();
        let result = self
            .inner
            .backfill_operation(account_id, category_id, amount, date);
        Self::log_outcome("backfill_operation", account_id, started, &result);
        result
    }

    /// See [`LedgerCoordinator::delete_user`].
    pub fn delete_user(&self, user_id: UserId) -> bool {
        let started = Instant::now();
        let existed = self.inner.delete_user(user_id);
        tracing::info!(
            %user_id,
            existed,
            elapsed_us = started.elapsed().as_micros() as u64,
            "delete_user finished"
        );
        existed
    }

    fn log_outcome(
        entrypoint: &str,
        account_id: AccountId,
        started: Instant,
        result: &Result<Arc<Operation>, LedgerError>,
    ) {
        let elapsed_us = started.elapsed().as_micros() as u64;
        match result {
            Ok(operation) => tracing::info!(
                %account_id,
                operation = %operation.id,
                amount = %operation.amount,
                elapsed_us,
                "{entrypoint} committed"
            ),
            Err(error) => tracing::warn!(
                %account_id,
                %error,
                elapsed_us,
                "{entrypoint} rejected"
            ),
        }
    }
}
