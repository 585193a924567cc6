//! Read-mostly registry of government services.

use std::sync::Mutex;

use tugendane_core::{GeoPoint, Service, ServiceCategory};

use crate::error::StoreError;

/// In-memory service registry. Seeded at startup, read-only afterwards from
/// the dialog engine's point of view.
pub struct ServiceStore {
    services: Mutex<Vec<Service>>,
}

impl ServiceStore {
    pub fn new() -> Self {
        Self {
            services: Mutex::new(Vec::new()),
        }
    }

    /// Insert a service, assigning the next id. Returns the stored record.
    pub fn insert(
        &self,
        name: &str,
        category: ServiceCategory,
        location: GeoPoint,
    ) -> Result<Service, StoreError> {
        self.insert_full(Service {
            id: 0,
            name: name.to_string(),
            category,
            description: None,
            phone: None,
            address: None,
            hours: None,
            required_documents: None,
            location,
        })
    }

    /// Insert a fully described service. The id field is overwritten.
    pub fn insert_full(&self, mut service: Service) -> Result<Service, StoreError> {
        let mut services = self.services.lock().map_err(StoreError::poisoned)?;
        service.id = services.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        services.push(service.clone());
        Ok(service)
    }

    pub fn get(&self, id: u64) -> Result<Service, StoreError> {
        let services = self.services.lock().map_err(StoreError::poisoned)?;
        services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::ServiceNotFound(id))
    }

    /// All services in insertion order.
    pub fn all(&self) -> Result<Vec<Service>, StoreError> {
        let services = self.services.lock().map_err(StoreError::poisoned)?;
        Ok(services.clone())
    }

    /// Services of one category, in insertion order.
    pub fn by_category(&self, category: ServiceCategory) -> Result<Vec<Service>, StoreError> {
        let services = self.services.lock().map_err(StoreError::poisoned)?;
        Ok(services
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect())
    }
}

impl Default for ServiceStore {
    fn default() -> Self {
        Self::new()
    }
}
