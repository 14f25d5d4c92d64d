//! Canonical event types emitted by the PrivateAudit registry contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/private_audit/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the registry contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A project submitted a contract (`requested` topic).
    AuditRequested,
    /// The owner assigned an auditor (`assigned` topic).
    AuditorAssigned,
    /// The assigned auditor attached a finding (`finding` topic).
    FindingAdded,
    /// Score and report were published (`completed` topic).
    AuditCompleted,
    /// The project fixed a finding (`resolved` topic).
    FindingResolved,
    /// The project disclosed one finding (`fdisclose` topic).
    FindingDisclosed,
    /// The project disclosed the full report (`disclosed` topic).
    ReportDisclosed,
    /// The project disputed a completed audit (`disputed` topic).
    AuditDisputed,
    /// A new auditor identity was registered (`aud_reg` topic).
    AuditorRegistered,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "requested" => Self::AuditRequested,
            "assigned" => Self::AuditorAssigned,
            "finding" => Self::FindingAdded,
            "completed" => Self::AuditCompleted,
            "resolved" => Self::FindingResolved,
            "fdisclose" => Self::FindingDisclosed,
            "disclosed" => Self::ReportDisclosed,
            "disputed" => Self::AuditDisputed,
            "aud_reg" => Self::AuditorRegistered,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuditRequested => "audit_requested",
            Self::AuditorAssigned => "auditor_assigned",
            Self::FindingAdded => "finding_added",
            Self::AuditCompleted => "audit_completed",
            Self::FindingResolved => "finding_resolved",
            Self::FindingDisclosed => "finding_disclosed",
            Self::ReportDisclosed => "report_disclosed",
            Self::AuditDisputed => "audit_disputed",
            Self::AuditorRegistered => "auditor_registered",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`], used when reading rows back.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "audit_requested" => Self::AuditRequested,
            "auditor_assigned" => Self::AuditorAssigned,
            "finding_added" => Self::FindingAdded,
            "audit_completed" => Self::AuditCompleted,
            "finding_resolved" => Self::FindingResolved,
            "finding_disclosed" => Self::FindingDisclosed,
            "report_disclosed" => Self::ReportDisclosed,
            "audit_disputed" => Self::AuditDisputed,
            "auditor_registered" => Self::AuditorRegistered,
            _ => Self::Unknown,
        }
    }
}

/// A fully decoded registry event, ready to be stored in the database.
///
/// `value` holds the kind-specific scalar: the public score for
/// `audit_completed`, the severity code for `finding_added`, and the finding
/// index for `finding_resolved` / `finding_disclosed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Stable per-event key; re-polling the same event yields the same key.
    pub event_id: String,
    pub event_type: String,
    pub audit_id: Option<String>,
    pub actor: Option<String>,
    pub value: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub audit_id: Option<String>,
    pub actor: Option<String>,
    pub value: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }

    /// `value` parsed as an unsigned integer, if present and numeric.
    pub fn value_u32(&self) -> Option<u32> {
        self.value.as_deref().and_then(|v| v.parse().ok())
    }
}
