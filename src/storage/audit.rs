// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-sensitive operations.
//!
//! Registrations, logins, credential links and provisioning are appended to
//! the `audit_events` table of the credential database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Types of auditable events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Account events
    AccountRegistered,
    LoginSucceeded,
    LoginFailed,

    // Credential events
    CredentialLinked,
    CredentialLinkRejected,
    CredentialProvisioned,

    // Access control
    PermissionDenied,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// Account email that triggered the event (if known).
    pub account: Option<String>,
    /// Resource type (`drivers_license`, `account`, ...).
    pub resource_type: Option<String>,
    /// Resource affected (record number, email).
    pub resource_id: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if the operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            account: None,
            resource_type: None,
            resource_id: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the acting account.
    pub fn with_account(mut self, email: impl Into<String>) -> Self {
        self.account = Some(email.into());
        self
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    /// Storage key: zero-padded microsecond timestamp, then the event ID,
    /// so lexicographic order is chronological order.
    pub(crate) fn storage_key(&self) -> String {
        format!(
            "{:020}-{}",
            self.timestamp.timestamp_micros().max(0),
            self.event_id
        )
    }
}

/// Append an audit event, logging (not propagating) storage failures.
#[macro_export]
macro_rules! audit_log {
    ($store:expr, $event:expr) => {{
        if let Err(e) = $store.append_audit(&$event) {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
    }};
}
