//! crates/interview_prep_core/src/selection.rs
//!
//! The Selection Store: the role and company the user is preparing for.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub role: Option<String>,
    pub company: Option<String>,
}

/// Independent last-write-wins setters over a [`Selection`].
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    current: Selection,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_role(&mut self, role: Option<String>) {
        self.current.role = role;
    }

    pub fn set_company(&mut self, company: Option<String>) {
        self.current.company = company;
    }

    pub fn role(&self) -> Option<&str> {
        self.current.role.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.current.company.as_deref()
    }

    pub fn snapshot(&self) -> Selection {
        self.current.clone()
    }
}
