//! Mutable per-session capture context.
//!
//! Tags, user identity, and extra context attached to every event built
//! while they are set. Event construction takes a snapshot copy, so later
//! mutations never retroactively alter already-built events.

use std::collections::HashMap;

use serde_json::Value;

use fl_models::User;

/// Per-session state merged into captured events.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    tags: HashMap<String, String>,
    user: Option<User>,
    extras: HashMap<String, Value>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single tag.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Merge a map of tags over the current ones.
    pub fn set_tags(&mut self, tags: HashMap<String, String>) {
        self.tags.extend(tags);
    }

    /// Replace the current user. `None` clears it.
    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Set a single extra value. A `None` value deletes the key instead of
    /// storing an absent placeholder.
    pub fn set_extra(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.extras.insert(key, value);
            }
            None => {
                self.extras.remove(&key);
            }
        }
    }

    /// Merge a map of extras, applying the same delete rule per key.
    pub fn set_extras(&mut self, extras: HashMap<String, Option<Value>>) {
        for (key, value) in extras {
            self.set_extra(key, value);
        }
    }

    /// Current tags.
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Current user.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Current extras.
    pub fn extras(&self) -> &HashMap<String, Value> {
        &self.extras
    }

    /// Owned copy for event construction. Events built from a snapshot are
    /// immune to later scope mutations.
    pub fn snapshot(&self) -> Scope {
        self.clone()
    }
}
