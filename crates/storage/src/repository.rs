//! Service State Repository

use crate::StorageError;
use async_trait::async_trait;
use escalation::ports::StateStore;
use escalation::{EscalationError, MonitoredService, ServiceState, ServiceStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Flat, persisted form of a service record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredService {
    pub service_id: String,
    pub status: ServiceStatus,
    pub current_level: Option<u32>,
    pub version: u64,
    pub updated_at_ms: i64,
}

impl StoredService {
    fn from_service(service: &MonitoredService, version: u64) -> Self {
        Self {
            service_id: service.service_id.clone(),
            status: service.status(),
            current_level: service.current_level(),
            version,
            updated_at_ms: now_ms(),
        }
    }

    fn to_service(&self) -> Result<MonitoredService, StorageError> {
        let state = ServiceState::from_parts(self.status, self.current_level)
            .ok_or_else(|| StorageError::CorruptRecord(self.service_id.clone()))?;
        Ok(MonitoredService::with_state(
            self.service_id.clone(),
            state,
            self.version,
        ))
    }
}

/// Service state store (in-memory).
///
/// Saves are compare-and-swap on `version`: a write carrying a stale version
/// is rejected, so two handlers racing on one service cannot both win.
pub struct InMemoryStateStore {
    records: Mutex<HashMap<String, StoredService>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        info!("Creating in-memory state store");
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Restore a store from [`snapshot`](Self::snapshot) bytes
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, StorageError> {
        let records: Vec<StoredService> = postcard::from_bytes(bytes)?;
        for record in &records {
            record.to_service()?;
        }
        info!("Restored {} service records from snapshot", records.len());

        Ok(Self {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|r| (r.service_id.clone(), r))
                    .collect(),
            ),
        })
    }

    /// Serialize all records, ordered by service id
    pub fn snapshot(&self) -> Result<Vec<u8>, StorageError> {
        let records = self.lock()?;
        let mut all: Vec<&StoredService> = records.values().collect();
        all.sort_by(|a, b| a.service_id.cmp(&b.service_id));
        Ok(postcard::to_allocvec(&all)?)
    }

    pub fn get(&self, service_id: &str) -> Result<Option<MonitoredService>, StorageError> {
        let records = self.lock()?;
        records.get(service_id).map(StoredService::to_service).transpose()
    }

    /// Write `service` if its version matches the stored one.
    ///
    /// Unsaved services carry version 0 and only succeed while no record
    /// exists. Returns the new version.
    pub fn save(&self, service: &MonitoredService) -> Result<u64, StorageError> {
        let mut records = self.lock()?;
        let found = records
            .get(&service.service_id)
            .map(|r| r.version)
            .unwrap_or(0);

        if found != service.version {
            warn!(
                "Rejected stale write for service {} (version {} != {})",
                service.service_id, service.version, found
            );
            return Err(StorageError::VersionConflict {
                service_id: service.service_id.clone(),
                expected: service.version,
                found,
            });
        }

        let version = found + 1;
        records.insert(
            service.service_id.clone(),
            StoredService::from_service(service, version),
        );
        debug!("Saved service {} at version {}", service.service_id, version);

        Ok(version)
    }

    /// Every stored service, ordered by id
    pub fn list(&self) -> Result<Vec<MonitoredService>, StorageError> {
        let records = self.lock()?;
        let mut services = records
            .values()
            .map(StoredService::to_service)
            .collect::<Result<Vec<_>, _>>()?;
        services.sort_by(|a, b| a.service_id.cmp(&b.service_id));
        Ok(services)
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredService>>, StorageError> {
        self.records
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_service_state(
        &self,
        service_id: &str,
    ) -> Result<Option<MonitoredService>, EscalationError> {
        Ok(self.get(service_id)?)
    }

    async fn save_service_state(&self, service: &MonitoredService) -> Result<(), EscalationError> {
        self.save(service)?;
        Ok(())
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
