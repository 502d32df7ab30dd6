//! The signed-in user, held explicitly and handed to whoever needs it.
//!
//! Front ends that redraw on sign-in/sign-out register a callback with
//! [`Session::subscribe`]; every change is pushed to all subscribers in the
//! order they subscribed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            full_name: None,
        }
    }

    /// Full name, else email, else the id.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.id)
    }

    /// Up to two upper-case initials of the display name.
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Option<&User>) + Send + Sync>;

#[derive(Default)]
pub struct Session {
    user: Option<User>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Result<&str> {
        self.user
            .as_ref()
            .map(|user| user.id.as_str())
            .ok_or(Error::NotSignedIn)
    }

    pub fn sign_in(&mut self, user: User) {
        tracing::info!(user_id = %user.id, "signed in");
        self.user = Some(user);
        self.notify();
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user_id = %user.id, "signed out");
        }
        self.notify();
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(Option<&User>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let user = self.user.as_ref();
        for (_, listener) in &mut self.listeners {
            listener(user);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
