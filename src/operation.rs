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

//! Journal operations.

use crate::base::{AccountId, CategoryId, OperationId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One dated movement of money against exactly one account.
///
/// The amount is always positive; its sign is derived from the category's
/// kind at commit time and never stored. Operations are immutable once
/// appended to the journal and are shared via `Arc` for lock-free reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub id: OperationId,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    pub amount: Decimal,
    pub date: NaiveDate,
}
