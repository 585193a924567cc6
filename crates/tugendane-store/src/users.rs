//! User records keyed by channel address.

use std::sync::Mutex;

use tracing::info;
use uuid::Uuid;

use tugendane_core::{GeoPoint, KnownLocation, Language, Timestamp, User};

use crate::error::StoreError;

/// In-memory user store.
pub struct UserStore {
    users: Mutex<Vec<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }

    /// Find a user by address, creating one on first contact.
    pub fn get_or_create(&self, address: &str, language: Language) -> Result<User, StoreError> {
        let mut users = self.users.lock().map_err(StoreError::poisoned)?;
        if let Some(user) = users.iter().find(|u| u.address == address) {
            return Ok(user.clone());
        }
        let now = Timestamp::now();
        let user = User {
            id: Uuid::new_v4(),
            address: address.to_string(),
            language,
            last_location: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        info!("Created new user for address {}", address);
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> Result<User, StoreError> {
        let users = self.users.lock().map_err(StoreError::poisoned)?;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::UserNotFound(id))
    }

    /// Update the stored language preference.
    pub fn set_language(&self, id: Uuid, language: Language) -> Result<User, StoreError> {
        self.update(id, |user| user.language = language)
    }

    /// Record the user's last known coordinates.
    pub fn set_location(&self, id: Uuid, point: GeoPoint) -> Result<User, StoreError> {
        self.update(id, |user| {
            user.last_location = Some(KnownLocation {
                point,
                recorded_at: Timestamp::now(),
            });
        })
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut User)) -> Result<User, StoreError> {
        let mut users = self.users.lock().map_err(StoreError::poisoned)?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))?;
        f(user);
        user.updated_at = Timestamp::now();
        Ok(user.clone())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_creates_once() {
        let store = UserStore::new();
        let a = store.get_or_create("+250788000001", Language::En).unwrap();
        let b = store.get_or_create("+250788000001", Language::Rw).unwrap();
        assert_eq!(a.id, b.id);
        // Existing user keeps their preference.
        assert_eq!(b.language, Language::En);
    }

    #[test]
    fn test_get_not_found() {
        let store = UserStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()),
            Err(StoreError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_set_language() {
        let store = UserStore::new();
        let user = store.get_or_create("+250788000002", Language::En).unwrap();
        let updated = store.set_language(user.id, Language::Rw).unwrap();
        assert_eq!(updated.language, Language::Rw);
        assert_eq!(store.get(user.id).unwrap().language, Language::Rw);
    }

    #[test]
    fn test_set_location() {
        let store = UserStore::new();
        let user = store.get_or_create("+250788000003", Language::En).unwrap();
        assert!(user.last_location.is_none());

        let point = GeoPoint {
            lat: -1.9441,
            lng: 30.0619,
        };
        let updated = store.set_location(user.id, point).unwrap();
        let loc = updated.last_location.unwrap();
        assert_eq!(loc.point, point);
        assert!(loc.recorded_at.0 > 0);
    }
}
