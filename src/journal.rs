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

//! Append-only operation journal.
//!
//! Pure storage: `append` assumes the caller (the coordinator) already
//! validated balance feasibility. Operations are immutable once appended
//! and shared via `Arc`, so lookups need no locking beyond the map shards.
//!
//! All lookups return results in arbitrary storage order; sorting for
//! presentation (by date, descending) is the caller's responsibility.

use crate::base::{AccountId, CategoryId, OperationId};
use crate::error::LedgerError;
use crate::operation::Operation;
use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only store of historical operations with secondary indexes.
pub struct OperationJournal {
    operations: DashMap<OperationId, Arc<Operation>>,
    by_account: DashMap<AccountId, Vec<OperationId>>,
    by_category: DashMap<CategoryId, Vec<OperationId>>,
    next_id: AtomicU64,
}

impl OperationJournal {
    pub fn new() -> Self {
        Self {
            operations: DashMap::new(),
            by_account: DashMap::new(),
            by_category: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends an operation and returns it with its generated id.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount` is zero or negative.
    /// - [`LedgerError::Conflict`] if the generated id collides with an
    ///   existing entry. Ids come from a process-wide sequence, so a
    ///   collision is a transient store fault; the coordinator retries it.
    pub fn append(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Arc<Operation>, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let id = OperationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let operation = Arc::new(Operation {
            id,
            account_id,
            category_id,
            amount,
            date,
        });

        // Entry API for atomic check-and-insert.
        match self.operations.entry(id) {
            Entry::Occupied(_) => Err(LedgerError::Conflict),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&operation));
                self.by_account.entry(account_id).or_default().push(id);
                self.by_category.entry(category_id).or_default().push(id);
                Ok(operation)
            }
        }
    }

    pub fn find(&self, id: OperationId) -> Option<Arc<Operation>> {
        self.operations.get(&id).map(|entry| Arc::clone(&entry))
    }

    pub fn find_by_account(&self, account_id: AccountId) -> Vec<Arc<Operation>> {
        self.collect_index(self.by_account.get(&account_id).map(|e| e.clone()))
    }

    pub fn find_by_category(&self, category_id: CategoryId) -> Vec<Arc<Operation>> {
        self.collect_index(self.by_category.get(&category_id).map(|e| e.clone()))
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Vec<Arc<Operation>> {
        self.operations
            .iter()
            .filter(|entry| entry.date == date)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Operations with `start <= date <= end` (inclusive both ends).
    pub fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Arc<Operation>> {
        self.operations
            .iter()
            .filter(|entry| entry.date >= start && entry.date <= end)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Removes every operation recorded against an account. One step of the
    /// explicit cascade; idempotent, returns the number removed.
    pub fn purge_account(&self, account_id: AccountId) -> usize {
        let ids = self
            .by_account
            .remove(&account_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();
        let mut removed = 0;
        for id in &ids {
            if let Some((_, operation)) = self.operations.remove(id) {
                if let Some(mut index) = self.by_category.get_mut(&operation.category_id) {
                    index.retain(|entry| entry != id);
                }
                removed += 1;
            }
        }
        removed
    }

    fn collect_index(&self, ids: Option<Vec<OperationId>>) -> Vec<Arc<Operation>> {
        ids.unwrap_or_default()
            .iter()
            .filter_map(|id| self.operations.get(id).map(|op| Arc::clone(&op)))
            .collect()
    }
}

impl Default for OperationJournal {
    fn default() -> Self {
        Self::new()
    }
}
