//! # Types
//!
//! Shared data structures used across all modules of the PrivateAudit registry.
//!
//! ## Design decisions
//!
//! ### Config / State / Report split
//!
//! An audit is internally stored as three separate ledger entries:
//!
//! - [`AuditConfig`]: written once by `request_audit`; never mutated.
//! - [`AuditState`]: written on assignment, completion, disclosure and dispute.
//! - the encrypted report: an opaque blob written exactly once at completion.
//!
//! Each finding's ciphertext is a separate entry keyed by `(audit_id, index)`
//! and is never rewritten. Its severity and flags sit in a compact
//! [`FindingStatus`] vector per audit, so remediation only touches that
//! vector and the audit grows by one small element per finding. A finding's
//! position in the vector is its permanent index.
//!
//! ### Status as a Finite-State Machine
//!
//! [`AuditStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! Pending ──► InProgress ──► Completed ──► Disputed
//! ```
//!
//! `Completed` and `Disputed` are terminal for score and status purposes.
//! Finding-level `resolved` / `disclosed` flags may still change after
//! completion, since remediation happens afterwards.

use soroban_sdk::{contracttype, Address, Bytes, BytesN, String, Vec};

/// Lifecycle status of an audit. Discriminants are the public status codes.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AuditStatus {
    /// Requested, waiting for an auditor.
    Pending = 0,
    /// Auditor assigned; findings may be added.
    InProgress = 1,
    /// Score and report published.
    Completed = 2,
    /// Project contested the completed audit.
    Disputed = 3,
}

/// Severity of a finding. `None` is the "unset" code and is never stored.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Severity {
    None = 0,
    Info = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Critical = 5,
}

impl Severity {
    /// Decode a caller-supplied severity code. Only `Info..=Critical` are
    /// accepted for findings.
    pub fn from_finding_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Info),
            2 => Some(Self::Low),
            3 => Some(Self::Medium),
            4 => Some(Self::High),
            5 => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Immutable audit configuration, written once at request time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditConfig {
    pub id: u64,
    pub project: Address,
    pub code_hash: BytesN<32>,
    pub contract_uri: String,
    pub submitted_at: u64,
}

/// Mutable audit state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditState {
    pub auditor: Option<Address>,
    pub status: AuditStatus,
    /// Ledger timestamp of completion, `0` until then.
    pub completed_at: u64,
    /// Public trust score in `0..=100`, `0` until completion.
    pub public_score: u32,
    /// Set by the project via `disclose_full_report`. Never reverts.
    pub disclosed: bool,
}

impl AuditState {
    pub fn new() -> Self {
        Self {
            auditor: None,
            status: AuditStatus::Pending,
            completed_at: 0,
            public_score: 0,
            disclosed: false,
        }
    }
}

/// Immutable content of one vulnerability / observation record.
///
/// Title and description are ciphertext produced by the external
/// confidential layer; the registry never inspects them.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub encrypted_title: Bytes,
    pub encrypted_description: Bytes,
    /// Digest binding title and description, for integrity checks off-chain.
    pub finding_hash: BytesN<32>,
}

/// Mutable remediation state of one finding.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FindingStatus {
    pub severity: Severity,
    pub resolved: bool,
    pub disclosed: bool,
}

impl FindingStatus {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            resolved: false,
            disclosed: false,
        }
    }
}

/// Per-identity auditor entry.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuditorRecord {
    pub registered: bool,
    pub reputation: u64,
}

/// Public projection of an audit returned by `get_public_audit_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicAuditInfo {
    pub project: Address,
    pub code_hash: BytesN<32>,
    pub submitted_at: u64,
    pub completed_at: u64,
    pub status: AuditStatus,
    pub public_score: u32,
    pub finding_count: u32,
    pub disclosed: bool,
}

/// Finding counts per severity, over all findings regardless of disclosure.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SeverityBreakdown {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub info: u32,
}

impl SeverityBreakdown {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
            Severity::None => {}
        }
    }

    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

/// Parallel per-finding vectors returned by `get_findings`, in creation order.
/// Ciphertext is intentionally absent.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FindingFlags {
    pub severities: Vec<Severity>,
    pub resolved: Vec<bool>,
    pub disclosed: Vec<bool>,
}
