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

//! Category registry.
//!
//! Stores income/expense categories per user. A category's kind is fixed
//! for its lifetime; name uniqueness mirrors the account directory.

use crate::base::{CategoryId, UserId};
use crate::category::{Category, CategoryKind};
use crate::error::LedgerError;
use crate::user::UserRoster;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store of categories, indexed by id, owner, and per-user name.
pub struct CategoryRegistry {
    roster: Arc<UserRoster>,
    categories: DashMap<CategoryId, Arc<Category>>,
    names: DashMap<(UserId, String), CategoryId>,
    by_user: DashMap<UserId, Vec<CategoryId>>,
    next_id: AtomicU64,
}

impl CategoryRegistry {
    pub fn new(roster: Arc<UserRoster>) -> Self {
        Self {
            roster,
            categories: DashMap::new(),
            names: DashMap::new(),
            by_user: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Lists the categories owned by a user.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UserNotFound`] if the user is not registered.
    pub fn list_categories(&self, user_id: UserId) -> Result<Vec<Arc<Category>>, LedgerError> {
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
            .filter_map(|id| self.categories.get(id).map(|c| Arc::clone(&c)))
            .collect())
    }

    /// Defines a new category for a user. The kind is immutable afterwards.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] if the user is not registered.
    /// - [`LedgerError::DuplicateName`] if the user already owns a category
    ///   with this exact name.
    pub fn define(
        &self,
        user_id: UserId,
        name: &str,
        kind: CategoryKind,
    ) -> Result<Arc<Category>, LedgerError> {
        if !self.roster.contains(user_id) {
            return Err(LedgerError::UserNotFound);
        }

        match self.names.entry((user_id, name.to_owned())) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateName),
            Entry::Vacant(entry) => {
                let id = CategoryId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let category = Arc::new(Category {
                    id,
                    user_id,
                    name: name.to_owned(),
                    kind,
                });
                self.categories.insert(id, Arc::clone(&category));
                self.by_user.entry(user_id).or_default().push(id);
                entry.insert(id);
                Ok(category)
            }
        }
    }

    /// Retrieves a category by id. Returns `None` if absent.
    pub fn find_category(&self, id: CategoryId) -> Option<Arc<Category>> {
        self.categories.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Removes every category owned by a user. One step of the explicit
    /// cascade; idempotent, returns the number of categories removed.
    pub fn remove_user_categories(&self, user_id: UserId) -> usize {
        let ids = self
            .by_user
            .remove(&user_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();
        let mut removed = 0;
        for id in &ids {
            if let Some((_, category)) = self.categories.remove(id) {
                self.names.remove(&(user_id, category.name.clone()));
                removed += 1;
            }
        }
        removed
    }
}
