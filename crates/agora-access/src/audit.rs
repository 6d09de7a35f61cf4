//! Access decision auditing.

use crate::AccessError;
use agora_core::{Identity, RoleLabel, UserKey};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Decision procedure that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    /// Role membership only.
    Role,
    /// Role membership plus ownership.
    Ownership,
    /// Role membership plus assignment eligibility.
    Assignment,
}

/// Audit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    /// Access allowed.
    Allowed,
    /// Access denied.
    Denied,
    /// Access could not be verified.
    Error,
}

/// Audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event ID.
    pub id: String,
    /// Timestamp.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Procedure evaluated.
    pub procedure: Procedure,
    /// Acting user, if resolved.
    pub user_key: Option<UserKey>,
    /// Acting user's role, if resolved.
    pub role: Option<RoleLabel>,
    /// Target of an assignment or owner of a resource.
    pub target: Option<UserKey>,
    /// Decision made.
    pub decision: AuditDecision,
    /// Error code for denials and errors.
    pub reason: Option<String>,
}

impl AuditEvent {
    /// Creates an event for an allowed decision.
    pub fn allowed(procedure: Procedure, identity: &Identity, target: Option<&UserKey>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            procedure,
            user_key: Some(identity.key.clone()),
            role: Some(identity.role),
            target: target.cloned(),
            decision: AuditDecision::Allowed,
            reason: None,
        }
    }

    /// Creates an event for a failed decision.
    pub fn failed(
        procedure: Procedure,
        identity: Option<&Identity>,
        target: Option<&UserKey>,
        error: &AccessError,
    ) -> Self {
        let decision = if error.is_denial() {
            AuditDecision::Denied
        } else {
            AuditDecision::Error
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            procedure,
            user_key: identity.map(|i| i.key.clone()),
            role: identity.map(|i| i.role),
            target: target.cloned(),
            decision,
            reason: Some(error.code().to_string()),
        }
    }
}

/// Audit log sink trait.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &AuditEvent);
}

/// In-memory audit sink (for testing/development).
pub struct InMemoryAuditSink {
    events: RwLock<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Creates a new in-memory sink keeping at most `max_events`.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            max_events,
        }
    }

    /// Returns all events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Returns denied events.
    pub fn denied_events(&self) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.decision == AuditDecision::Denied)
            .cloned()
            .collect()
    }

    /// Clears all events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        let mut events = self.events.write();
        events.push_back(event.clone());

        while events.len() > self.max_events {
            events.pop_front();
        }
    }
}

/// Audit sink that emits `tracing` records under the `audit` target.
///
/// Every decision is recorded at `info`; the engine already raises denials
/// and verification failures at `warn` and `error`.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let user_key = event.user_key.as_ref().map(UserKey::as_str).unwrap_or("-");
        let decision = match event.decision {
            AuditDecision::Allowed => "allowed",
            AuditDecision::Denied => "denied",
            AuditDecision::Error => "error",
        };

        tracing::info!(
            target: "audit",
            event_id = %event.id,
            user_key,
            role = ?event.role,
            procedure = ?event.procedure,
            target_key = ?event.target,
            decision,
            reason = ?event.reason,
            "Access audit"
        );
    }
}

/// Fans audit events out to every registered sink.
#[derive(Default)]
pub struct AccessAudit {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl AccessAudit {
    /// Creates a new audit service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Records an event to all sinks.
    pub fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_sink_is_bounded() {
        let sink = InMemoryAuditSink::new(2);
        let identity = Identity::new("u1", RoleLabel::User);

        for _ in 0..3 {
            sink.record(&AuditEvent::allowed(Procedure::Role, &identity, None));
        }

        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn test_failed_event_classification() {
        let identity = Identity::new("u1", RoleLabel::User);

        let denied = AuditEvent::failed(
            Procedure::Ownership,
            Some(&identity),
            None,
            &AccessError::OwnershipDenied,
        );
        assert_eq!(denied.decision, AuditDecision::Denied);
        assert_eq!(denied.reason.as_deref(), Some("OWNERSHIP_DENIED"));

        let error = AuditEvent::failed(
            Procedure::Role,
            None,
            None,
            &AccessError::EngineMisconfiguration("no credential".into()),
        );
        assert_eq!(error.decision, AuditDecision::Error);
        assert!(error.user_key.is_none());
    }

    #[test]
    fn test_tracing_sink_records_at_info() {
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct Levels(Arc<parking_lot::Mutex<Vec<tracing::Level>>>);

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Levels {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                self.0.lock().push(*event.metadata().level());
            }
        }

        let levels = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Levels(levels.clone()));
        let identity = Identity::new("u1", RoleLabel::User);

        tracing::subscriber::with_default(subscriber, || {
            TracingAuditSink.record(&AuditEvent::failed(
                Procedure::Role,
                Some(&identity),
                None,
                &AccessError::NoMatchingRole { role: RoleLabel::User },
            ));
            TracingAuditSink.record(&AuditEvent::failed(
                Procedure::Role,
                None,
                None,
                &AccessError::EngineMisconfiguration("no credential".into()),
            ));
        });

        assert_eq!(*levels.lock(), vec![tracing::Level::INFO, tracing::Level::INFO]);
    }

    #[test]
    fn test_fan_out() {
        let first = Arc::new(InMemoryAuditSink::new(10));
        let second = Arc::new(InMemoryAuditSink::new(10));
        let audit = AccessAudit::new()
            .with_sink(first.clone())
            .with_sink(second.clone())
            .with_sink(Arc::new(TracingAuditSink));

        let identity = Identity::new("a1", RoleLabel::Admin);
        audit.record(&AuditEvent::failed(
            Procedure::Assignment,
            Some(&identity),
            Some(&UserKey::from("t1")),
            &AccessError::AssignmentDenied { target_role: RoleLabel::SuperAdmin },
        ));

        assert_eq!(first.denied_events().len(), 1);
        assert_eq!(second.events().len(), 1);
        first.clear();
        assert!(first.events().is_empty());
    }
}
