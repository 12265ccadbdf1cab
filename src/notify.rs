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

//! User-facing notification events.
//!
//! Registration and account-opening emit fire-and-forget events to an
//! external observer (a message queue in production). Delivery is never
//! part of any atomic unit: a notifier must not fail the caller, and a
//! lost event leaves the ledger consistent.

use crate::base::UserId;
use crate::user::User;
use crossbeam::queue::SegQueue;

/// Observer for user-facing ledger events.
pub trait Notifier: Send + Sync {
    /// Delivers a message addressed to `user`. Must not block or panic.
    fn notify(&self, user: &User, message: &str);
}

/// Notifier that drops every event.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _user: &User, _message: &str) {}
}

/// Notifier that emits a tracing event per message.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user: &User, message: &str) {
        tracing::info!(user = %user.id, email = %user.email, message, "ledger notification");
    }
}

/// A pending notification held for an external consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    pub user_id: UserId,
    pub message: String,
}

/// Notifier that buffers events in a lock-free queue.
///
/// Stands in for an asynchronous producer: callers push without blocking,
/// a consumer drains in FIFO order whenever it gets around to it.
#[derive(Debug, Default)]
pub struct QueueNotifier {
    pending: SegQueue<PendingNotification>,
}

impl QueueNotifier {
    pub fn new() -> Self {
        Self {
            pending: SegQueue::new(),
        }
    }

    /// Removes and returns all buffered notifications in FIFO order.
    pub fn drain(&self) -> Vec<PendingNotification> {
        let mut drained = Vec::new();
        while let Some(event) = self.pending.pop() {
            drained.push(event);
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, user: &User, message: &str) {
        self.pending.push(PendingNotification {
            user_id: user.id,
            message: message.to_owned(),
        });
    }
}
