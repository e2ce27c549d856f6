//! Recording fakes for engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use escalation::ports::{Notifier, PolicySource, StateStore, TimerScheduler};
use escalation::{
    EngineConfig, EngineEvent, EnginePorts, EscalationEngine, EscalationError, EscalationLevel,
    EscalationObserver, EscalationPolicy, MonitoredService, ServiceState, Target,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SERVICE_ID: &str = "service-123";
pub const ALERT_MESSAGE: &str = "Database is down!";

/// Side effects in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Notify(Target, String),
    Timer(String, Duration),
    Save(MonitoredService),
}

#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

impl CallLog {
    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<(Target, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Notify(t, m) => Some((t, m)),
                _ => None,
            })
            .collect()
    }

    pub fn timers(&self) -> Vec<(String, Duration)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Timer(s, d) => Some((s, d)),
                _ => None,
            })
            .collect()
    }

    pub fn saves(&self) -> Vec<MonitoredService> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Save(s) => Some(s),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeStore {
    log: Arc<CallLog>,
    states: Mutex<HashMap<String, MonitoredService>>,
    pub fail_saves: Mutex<bool>,
}

#[async_trait]
impl StateStore for FakeStore {
    async fn get_service_state(
        &self,
        service_id: &str,
    ) -> Result<Option<MonitoredService>, EscalationError> {
        Ok(self.states.lock().unwrap().get(service_id).cloned())
    }

    async fn save_service_state(&self, service: &MonitoredService) -> Result<(), EscalationError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(EscalationError::Storage("store unavailable".to_string()));
        }
        self.log.push(Call::Save(service.clone()));
        let mut saved = service.clone();
        saved.version += 1;
        self.states
            .lock()
            .unwrap()
            .insert(service.service_id.clone(), saved);
        Ok(())
    }
}

pub struct FakePolicies {
    policies: HashMap<String, EscalationPolicy>,
    pub lookups: AtomicUsize,
}

#[async_trait]
impl PolicySource for FakePolicies {
    async fn get_policy_by_service_id(
        &self,
        service_id: &str,
    ) -> Result<EscalationPolicy, EscalationError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .policies
            .get(service_id)
            .cloned()
            .unwrap_or_else(|| EscalationPolicy::empty(service_id)))
    }
}

pub struct FakeNotifier {
    log: Arc<CallLog>,
    /// Fail when sending to this address
    pub fail_address: Mutex<Option<String>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_notification(
        &self,
        target: &Target,
        message: &str,
    ) -> Result<(), EscalationError> {
        if self.fail_address.lock().unwrap().as_deref() == Some(target.address.as_str()) {
            return Err(EscalationError::Notification(format!(
                "delivery to {target} failed"
            )));
        }
        self.log.push(Call::Notify(target.clone(), message.to_string()));
        Ok(())
    }
}

pub struct FakeTimer {
    log: Arc<CallLog>,
}

#[async_trait]
impl TimerScheduler for FakeTimer {
    async fn set_acknowledgement_timeout(
        &self,
        service_id: &str,
        delay: Duration,
    ) -> Result<(), EscalationError> {
        self.log.push(Call::Timer(service_id.to_string(), delay));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EscalationObserver for RecordingObserver {
    fn record(&self, event: &EngineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Engine wired to fakes, plus handles to inspect them
pub struct Harness {
    pub engine: EscalationEngine,
    pub log: Arc<CallLog>,
    pub store: Arc<FakeStore>,
    pub policies: Arc<FakePolicies>,
    pub notifier: Arc<FakeNotifier>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new(policies: Vec<EscalationPolicy>) -> Self {
        let log = Arc::new(CallLog::default());
        let store = Arc::new(FakeStore {
            log: log.clone(),
            states: Mutex::new(HashMap::new()),
            fail_saves: Mutex::new(false),
        });
        let policies = Arc::new(FakePolicies {
            policies: policies
                .into_iter()
                .map(|p| (p.service_id().to_string(), p))
                .collect(),
            lookups: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FakeNotifier {
            log: log.clone(),
            fail_address: Mutex::new(None),
        });
        let timer = Arc::new(FakeTimer { log: log.clone() });
        let observer = Arc::new(RecordingObserver::default());

        let engine = EscalationEngine::with_observer(
            EnginePorts {
                store: store.clone(),
                policies: policies.clone(),
                notifier: notifier.clone(),
                timer,
            },
            EngineConfig::default(),
            observer.clone(),
        );

        Self {
            engine,
            log,
            store,
            policies,
            notifier,
            observer,
        }
    }

    /// Seed stored state without recording a save
    pub fn seed(&self, service_id: &str, state: ServiceState) {
        self.store.states.lock().unwrap().insert(
            service_id.to_string(),
            MonitoredService::with_state(service_id, state, 1),
        );
    }

    pub fn stored(&self, service_id: &str) -> Option<MonitoredService> {
        self.store.states.lock().unwrap().get(service_id).cloned()
    }

    pub fn policy_lookups(&self) -> usize {
        self.policies.lookups.load(Ordering::SeqCst)
    }
}

pub fn email_target() -> Target {
    Target::email("dev@example.com")
}

pub fn sms_target() -> Target {
    Target::sms("+15551234567")
}

/// Two-level policy: email at level 1, SMS at level 2
pub fn sample_policy() -> EscalationPolicy {
    EscalationPolicy::new(
        SERVICE_ID,
        vec![
            EscalationLevel::new(1, vec![email_target()]),
            EscalationLevel::new(2, vec![sms_target()]),
        ],
    )
    .unwrap()
}
