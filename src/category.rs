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

//! Income/expense categories.
//!
//! A category's kind is fixed at creation and determines the sign of every
//! operation recorded against it: expenses decrease the account balance,
//! income increases it. The amount itself is always stored positive.

use crate::base::{CategoryId, UserId};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a category: expense or income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl CategoryKind {
    /// Applies the category sign to a positive amount, yielding the balance
    /// delta: `+amount` for income, `-amount` for expense.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            CategoryKind::Income => amount,
            CategoryKind::Expense => -amount,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Expense => write!(f, "EXPENSE"),
            CategoryKind::Income => write!(f, "INCOME"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = LedgerError;

    /// Parses `EXPENSE`/`INCOME` (case-insensitive). An empty or unknown
    /// string is the untyped-boundary form of a category without a type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXPENSE" => Ok(CategoryKind::Expense),
            "INCOME" => Ok(CategoryKind::Income),
            _ => Err(LedgerError::MissingCategoryType),
        }
    }
}

/// An income/expense category owned by a user.
///
/// Immutable once created; the registry never hands out mutable access.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub kind: CategoryKind,
}
