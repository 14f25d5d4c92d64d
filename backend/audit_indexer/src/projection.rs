//! Folds the indexed event stream of one audit into the summary the
//! dashboard renders: lifecycle status, trust score band, severity counts and
//! remediation progress.
//!
//! The registry stays the source of truth; a summary is only as fresh as the
//! last indexed ledger, reported as `last_ledger`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::events::{EventKind, EventRecord};

/// Lifecycle status as observed through events. Ordered so that the furthest
/// state seen wins, whatever order events were indexed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPhase {
    Pending,
    InProgress,
    Completed,
    Disputed,
}

impl AuditPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Disputed => "Disputed",
        }
    }
}

/// Coarse reading of the 0–100 public trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBand {
    /// 80 and above.
    Strong,
    /// 60–79.
    Fair,
    /// 40–59.
    Weak,
    /// Below 40.
    Failing,
}

impl TrustBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Self::Strong,
            60..=79 => Self::Fair,
            40..=59 => Self::Weak,
            _ => Self::Failing,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub info: u32,
}

impl SeverityCounts {
    /// Count one finding by its registry severity code (`1` = Info … `5` = Critical).
    fn record(&mut self, code: u32) {
        match code {
            5 => self.critical += 1,
            4 => self.high += 1,
            3 => self.medium += 1,
            2 => self.low += 1,
            1 => self.info += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub audit_id: u64,
    pub project: Option<String>,
    pub code_hash: Option<String>,
    pub auditor: Option<String>,
    pub status: AuditPhase,
    pub status_label: &'static str,
    pub submitted_at: Option<String>,
    pub completed_at: Option<String>,
    /// Present once the audit is completed.
    pub public_score: Option<u32>,
    pub trust_band: Option<TrustBand>,
    pub finding_count: u32,
    pub severity: SeverityCounts,
    pub resolved_findings: usize,
    pub disclosed_findings: usize,
    pub report_disclosed: bool,
    pub last_ledger: i64,
}

fn iso(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.to_rfc3339())
}

/// Fold `events` (all belonging to `audit_id`) into a summary.
/// Returns `None` when nothing has been indexed for the audit.
pub fn summarize(audit_id: u64, events: &[EventRecord]) -> Option<AuditSummary> {
    if events.is_empty() {
        return None;
    }

    let mut summary = AuditSummary {
        audit_id,
        project: None,
        code_hash: None,
        auditor: None,
        status: AuditPhase::Pending,
        status_label: AuditPhase::Pending.label(),
        submitted_at: None,
        completed_at: None,
        public_score: None,
        trust_band: None,
        finding_count: 0,
        severity: SeverityCounts::default(),
        resolved_findings: 0,
        disclosed_findings: 0,
        report_disclosed: false,
        last_ledger: 0,
    };
    let mut resolved = BTreeSet::new();
    let mut disclosed = BTreeSet::new();

    for ev in events {
        summary.last_ledger = summary.last_ledger.max(ev.ledger);
        match ev.kind() {
            EventKind::AuditRequested => {
                summary.project = ev.actor.clone();
                summary.code_hash = ev.value.clone();
                summary.submitted_at = iso(ev.timestamp);
            }
            EventKind::AuditorAssigned => {
                summary.auditor = ev.actor.clone();
                summary.status = summary.status.max(AuditPhase::InProgress);
            }
            EventKind::FindingAdded => {
                summary.finding_count += 1;
                if let Some(code) = ev.value_u32() {
                    summary.severity.record(code);
                }
            }
            EventKind::AuditCompleted => {
                summary.status = summary.status.max(AuditPhase::Completed);
                summary.completed_at = iso(ev.timestamp);
                summary.public_score = ev.value_u32();
            }
            EventKind::FindingResolved => {
                if let Some(index) = ev.value_u32() {
                    resolved.insert(index);
                }
            }
            EventKind::FindingDisclosed => {
                if let Some(index) = ev.value_u32() {
                    disclosed.insert(index);
                }
            }
            EventKind::ReportDisclosed => summary.report_disclosed = true,
            EventKind::AuditDisputed => {
                summary.status = summary.status.max(AuditPhase::Disputed);
            }
            EventKind::AuditorRegistered | EventKind::Unknown => {}
        }
    }

    summary.status_label = summary.status.label();
    summary.trust_band = summary.public_score.map(TrustBand::from_score);
    summary.resolved_findings = resolved.len();
    summary.disclosed_findings = disclosed.len();
    Some(summary)
}
