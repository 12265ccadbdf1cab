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

//! Aggregation over resolved operations.
//!
//! Stateless, pure functions: no I/O, no failure modes. They operate on
//! [`OperationView`]s, where the category kind has already been resolved
//! (see `LedgerCoordinator::resolve`); a view cannot exist with an
//! unresolved category.

use crate::category::CategoryKind;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// An operation joined with its category kind, ready for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationView {
    pub amount: Decimal,
    pub kind: CategoryKind,
    pub date: NaiveDate,
}

/// Totals over a list of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total_expense: Decimal,
    pub total_income: Decimal,
}

/// Sums the amounts of operations whose category kind matches.
///
/// Returns zero for an empty input. Deterministic in the input list:
/// repeated calls and reordered inputs yield the same result.
pub fn sum(operations: &[OperationView], kind: CategoryKind) -> Decimal {
    operations
        .iter()
        .filter(|view| view.kind == kind)
        .map(|view| view.amount)
        .sum()
}

/// Computes the count and per-kind totals over a list of operations.
pub fn summarize(operations: &[OperationView]) -> Summary {
    Summary {
        count: operations.len(),
        total_expense: sum(operations, CategoryKind::Expense),
        total_income: sum(operations, CategoryKind::Income),
    }
}
