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

//! Error types for the ledger subsystem.

use thiserror::Error;

/// Ledger processing errors.
///
/// Every variant except [`LedgerError::Conflict`] is a business-rule
/// rejection: it is raised before any mutation becomes visible and must not
/// be retried. `Conflict` is a transient store failure; the coordinator
/// retries it a bounded number of times before surfacing it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Referenced user does not exist
    #[error("user not found")]
    UserNotFound,

    /// Referenced account does not exist
    #[error("account not found")]
    AccountNotFound,

    /// Referenced category does not exist
    #[error("category not found")]
    CategoryNotFound,

    /// Referenced operation does not exist
    #[error("operation not found")]
    OperationNotFound,

    /// The user already owns an account or category with this name
    #[error("name already in use for this user")]
    DuplicateName,

    /// Balance is missing or negative
    #[error("invalid balance (must be present and non-negative)")]
    InvalidBalance,

    /// Operation amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Category created without a type
    #[error("missing category type")]
    MissingCategoryType,

    /// Operation would drive the account balance negative
    #[error("insufficient funds on account")]
    InsufficientFunds,

    /// Transient store conflict; retried internally, surfaced when exhausted
    #[error("store conflict, retries exhausted")]
    Conflict,
}
