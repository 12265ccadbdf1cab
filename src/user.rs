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

//! User identities and the roster that owns them.
//!
//! The roster is an explicitly-scoped store instance, injected into the
//! directory and registry; nothing in this crate keeps ambient global
//! state.

use crate::base::UserId;
use crate::notify::Notifier;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A registered user. Owns accounts and categories by id through the
/// directory and registry; the user record itself carries no back-pointers.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Store of registered users.
pub struct UserRoster {
    users: DashMap<UserId, Arc<User>>,
    next_id: AtomicU64,
    notifier: Arc<dyn Notifier>,
}

impl UserRoster {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicU64::new(1),
            notifier,
        }
    }

    /// Registers a new user.
    ///
    /// Emits a fire-and-forget "account registered" notification; delivery
    /// is not part of the registration guarantee.
    pub fn register(&self, name: &str, email: &str) -> Arc<User> {
        let id = UserId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let user = Arc::new(User {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
        });
        self.users.insert(id, Arc::clone(&user));
        self.notifier.notify(&user, "account registered");
        user
    }

    pub fn find(&self, id: UserId) -> Option<Arc<User>> {
        self.users.get(&id).map(|entry| Arc::clone(&entry))
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    pub fn all(&self) -> Vec<Arc<User>> {
        self.users
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Removes a user record. Idempotent: returns `false` if the user was
    /// already gone. Accounts, categories, and operations are cascaded by
    /// the coordinator's explicit deletion sequence, not here.
    pub fn remove(&self, id: UserId) -> bool {
        self.users.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
