//! Emergency contact roster.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A person to alert during an emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Reserved for warning-phase notification policies; the dispatch
    /// fan-out itself only fires on emergency entry.
    #[serde(default)]
    pub notify_on_warning: bool,
    #[serde(default)]
    pub notify_on_emergency: bool,
    #[serde(default)]
    pub enable_sms: bool,
    #[serde(default)]
    pub enable_email: bool,
}

/// Contact fields prior to id assignment.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notify_on_warning: bool,
    pub notify_on_emergency: bool,
    pub enable_sms: bool,
    pub enable_email: bool,
}

/// Roster with unique-id discipline: ids are assigned here, never reused,
/// and never shared between two contacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactBook {
    contacts: Vec<Contact>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an externally loaded roster. Duplicate ids are rejected rather
    /// than deduplicated.
    pub fn from_contacts(contacts: Vec<Contact>) -> Result<Self, ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for contact in &contacts {
            if !seen.insert(contact.id) {
                return Err(ValidationError::DuplicateContactId { id: contact.id });
            }
        }
        Ok(Self { contacts })
    }

    /// Add a contact, assigning it a fresh unique id.
    pub fn add(&mut self, new: NewContact) -> Uuid {
        let id = Uuid::new_v4();
        self.contacts.push(Contact {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            notify_on_warning: new.notify_on_warning,
            notify_on_emergency: new.notify_on_emergency,
            enable_sms: new.enable_sms,
            enable_email: new.enable_email,
        });
        id
    }

    /// Replace the contact with the same id.
    pub fn edit(&mut self, updated: Contact) -> Result<(), ValidationError> {
        match self.contacts.iter_mut().find(|c| c.id == updated.id) {
            Some(existing) => {
                *existing = updated;
                Ok(())
            }
            None => Err(ValidationError::UnknownContact { id: updated.id }),
        }
    }

    /// Remove a contact by id, returning it.
    pub fn remove(&mut self, id: Uuid) -> Result<Contact, ValidationError> {
        match self.contacts.iter().position(|c| c.id == id) {
            Some(index) => Ok(self.contacts.remove(index)),
            None => Err(ValidationError::UnknownContact { id }),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
