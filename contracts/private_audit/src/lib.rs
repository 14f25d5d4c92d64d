//! # PrivateAudit Registry Contract
//!
//! Authoritative ledger of smart-contract audit requests, their lifecycle,
//! the findings auditors attach to them, and the public metrics derived from
//! those findings. Finding contents and the final report are ciphertext
//! produced by an external confidential layer; this contract stores them as
//! opaque bytes and never reads them.
//!
//! | Phase        | Entry Point(s)                                          |
//! |--------------|---------------------------------------------------------|
//! | Bootstrap    | [`AuditRegistry::init`]                                 |
//! | Auditors     | `register_auditor`, `assign_auditor`                    |
//! | Submission   | [`AuditRegistry::request_audit`]                        |
//! | Review       | `add_finding`, `complete_audit`                         |
//! | Remediation  | `resolve_finding`, `disclose_finding`                   |
//! | Publication  | `disclose_full_report`, `dispute_audit`                 |
//! | Queries      | `get_public_audit_info`, `get_severity_breakdown`, `get_findings`, `get_finding_hash`, `get_project_audits`, `next_audit_id`, `auditor_reputation`, `registered_auditors` |
//!
//! ## Architecture
//!
//! Authorization is delegated to [`access`]. Storage access is delegated to
//! [`storage`]. Every entry point validates all of its preconditions before
//! the first write, so a rejected call leaves the ledger untouched.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Bytes, BytesN, Env, String, Vec};

mod access;
pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_disclosure;

pub use types::{
    AuditConfig, AuditState, AuditStatus, AuditorRecord, Finding, FindingFlags, FindingStatus,
    PublicAuditInfo, Severity, SeverityBreakdown,
};

/// Highest accepted public trust score.
pub const MAX_PUBLIC_SCORE: u32 = 100;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotAuthorized = 1,
    AuditNotFound = 2,
    FindingNotFound = 3,
    InvalidStatus = 4,
    InvalidSeverity = 5,
    InvalidScore = 6,
    EmptyContractUri = 7,
    AuditorNotRegistered = 8,
    FindingAlreadyResolved = 9,
    FindingNotResolved = 10,
    FindingAlreadyDisclosed = 11,
    AlreadyInitialized = 12,
    NotInitialized = 13,
}

/// Coarse classification of [`Error`] for clients deciding how to react.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Authorization,
    NotFound,
    InvalidState,
    InvalidArgument,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotAuthorized => ErrorKind::Authorization,
            Error::AuditNotFound | Error::FindingNotFound => ErrorKind::NotFound,
            Error::InvalidStatus
            | Error::FindingAlreadyResolved
            | Error::FindingNotResolved
            | Error::FindingAlreadyDisclosed
            | Error::AlreadyInitialized
            | Error::NotInitialized => ErrorKind::InvalidState,
            Error::InvalidSeverity
            | Error::InvalidScore
            | Error::EmptyContractUri
            | Error::AuditorNotRegistered => ErrorKind::InvalidArgument,
        }
    }
}

fn status_at(statuses: &Vec<FindingStatus>, index: u32) -> Result<FindingStatus, Error> {
    statuses.get(index).ok_or(Error::FindingNotFound)
}

#[contract]
pub struct AuditRegistry;

#[contractimpl]
impl AuditRegistry {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the registry and set its owner.
    ///
    /// Must be called exactly once immediately after deployment.
    pub fn init(env: Env, owner: Address) -> Result<(), Error> {
        if storage::has_owner(&env) {
            return Err(Error::AlreadyInitialized);
        }
        owner.require_auth();
        storage::set_owner(&env, &owner);
        Ok(())
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        storage::get_owner(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Auditor management
    // ─────────────────────────────────────────────────────────

    /// Mark `auditor` as registered. Owner only.
    ///
    /// Registering an already-registered identity succeeds without changing
    /// its reputation.
    pub fn register_auditor(env: Env, caller: Address, auditor: Address) -> Result<(), Error> {
        access::require_owner(&env, &caller)?;

        let mut record = storage::load_auditor(&env, &auditor);
        if record.registered {
            return Ok(());
        }
        record.registered = true;
        storage::save_auditor(&env, &auditor, &record);
        events::auditor_registered(&env, auditor);
        Ok(())
    }

    /// Assign a registered auditor to a pending audit. Owner only.
    pub fn assign_auditor(
        env: Env,
        caller: Address,
        audit_id: u64,
        auditor: Address,
    ) -> Result<(), Error> {
        access::require_owner(&env, &caller)?;

        let mut state = storage::load_audit_state(&env, audit_id)?;
        if !storage::load_auditor(&env, &auditor).registered {
            return Err(Error::AuditorNotRegistered);
        }
        if state.status != AuditStatus::Pending {
            return Err(Error::InvalidStatus);
        }

        state.auditor = Some(auditor.clone());
        state.status = AuditStatus::InProgress;
        storage::save_audit_state(&env, audit_id, &state);

        events::auditor_assigned(&env, audit_id, auditor);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────

    /// Submit a contract for audit. `project` becomes the audit's owner.
    ///
    /// Identical `(contract_uri, code_hash)` pairs may be submitted any number
    /// of times; each call creates a separate audit.
    pub fn request_audit(
        env: Env,
        project: Address,
        contract_uri: String,
        code_hash: BytesN<32>,
    ) -> Result<u64, Error> {
        project.require_auth();
        if contract_uri.len() == 0 {
            return Err(Error::EmptyContractUri);
        }

        let id = storage::get_and_increment_audit_id(&env);
        let config = AuditConfig {
            id,
            project: project.clone(),
            code_hash: code_hash.clone(),
            contract_uri,
            submitted_at: env.ledger().timestamp(),
        };
        storage::save_new_audit(&env, &config);

        events::audit_requested(&env, id, project, code_hash);
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────
    // Review
    // ─────────────────────────────────────────────────────────

    /// Append a finding to an in-progress audit. Assigned auditor only.
    ///
    /// Returns the index of the new finding, which stays valid for the
    /// lifetime of the audit.
    pub fn add_finding(
        env: Env,
        auditor: Address,
        audit_id: u64,
        severity: u32,
        encrypted_title: Bytes,
        encrypted_description: Bytes,
        finding_hash: BytesN<32>,
    ) -> Result<u32, Error> {
        let state = storage::load_audit_state(&env, audit_id)?;
        access::require_assigned_auditor(&auditor, &state)?;
        if state.status != AuditStatus::InProgress {
            return Err(Error::InvalidStatus);
        }
        let severity = Severity::from_finding_code(severity).ok_or(Error::InvalidSeverity)?;

        let mut statuses = storage::load_finding_statuses(&env, audit_id)?;
        let index = statuses.len();
        storage::save_finding(
            &env,
            audit_id,
            index,
            &Finding {
                severity,
                encrypted_title,
                encrypted_description,
                finding_hash: finding_hash.clone(),
            },
        );
        statuses.push_back(FindingStatus::new(severity));
        storage::save_finding_statuses(&env, audit_id, &statuses);

        events::finding_added(&env, audit_id, index, severity, finding_hash);
        Ok(index)
    }

    /// Publish the trust score and encrypted report. Assigned auditor only,
    /// exactly once per audit.
    ///
    /// Completion credits the auditor with one reputation point.
    pub fn complete_audit(
        env: Env,
        auditor: Address,
        audit_id: u64,
        public_score: u32,
        encrypted_report: Bytes,
    ) -> Result<(), Error> {
        let mut state = storage::load_audit_state(&env, audit_id)?;
        access::require_assigned_auditor(&auditor, &state)?;
        if state.status != AuditStatus::InProgress {
            return Err(Error::InvalidStatus);
        }
        if public_score > MAX_PUBLIC_SCORE {
            return Err(Error::InvalidScore);
        }
        let finding_count = storage::load_finding_statuses(&env, audit_id)?.len();

        state.public_score = public_score;
        state.completed_at = env.ledger().timestamp();
        state.status = AuditStatus::Completed;
        storage::save_audit_state(&env, audit_id, &state);
        storage::save_audit_report(&env, audit_id, &encrypted_report);

        let mut record = storage::load_auditor(&env, &auditor);
        record.reputation = record.reputation.saturating_add(1);
        storage::save_auditor(&env, &auditor, &record);

        events::audit_completed(&env, audit_id, public_score, finding_count);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Remediation & publication (project only)
    // ─────────────────────────────────────────────────────────

    /// Mark a finding as fixed. A finding can be resolved once.
    pub fn resolve_finding(
        env: Env,
        project: Address,
        audit_id: u64,
        finding_index: u32,
    ) -> Result<(), Error> {
        let config = storage::load_audit_config(&env, audit_id)?;
        access::require_project(&project, &config)?;

        let mut statuses = storage::load_finding_statuses(&env, audit_id)?;
        let mut status = status_at(&statuses, finding_index)?;
        if status.resolved {
            return Err(Error::FindingAlreadyResolved);
        }

        status.resolved = true;
        statuses.set(finding_index, status);
        storage::save_finding_statuses(&env, audit_id, &statuses);

        events::finding_resolved(&env, audit_id, finding_index);
        Ok(())
    }

    /// Make a single resolved finding public. A finding can be disclosed once,
    /// and only after it has been resolved.
    pub fn disclose_finding(
        env: Env,
        project: Address,
        audit_id: u64,
        finding_index: u32,
    ) -> Result<(), Error> {
        let config = storage::load_audit_config(&env, audit_id)?;
        access::require_project(&project, &config)?;

        let mut statuses = storage::load_finding_statuses(&env, audit_id)?;
        let mut status = status_at(&statuses, finding_index)?;
        if !status.resolved {
            return Err(Error::FindingNotResolved);
        }
        if status.disclosed {
            return Err(Error::FindingAlreadyDisclosed);
        }

        status.disclosed = true;
        statuses.set(finding_index, status);
        storage::save_finding_statuses(&env, audit_id, &statuses);

        events::finding_disclosed(&env, audit_id, finding_index);
        Ok(())
    }

    /// Make the whole report public. Requires a completed audit.
    ///
    /// Per-finding `disclosed` flags are left as they are.
    pub fn disclose_full_report(env: Env, project: Address, audit_id: u64) -> Result<(), Error> {
        let config = storage::load_audit_config(&env, audit_id)?;
        access::require_project(&project, &config)?;

        let mut state = storage::load_audit_state(&env, audit_id)?;
        if state.status != AuditStatus::Completed {
            return Err(Error::InvalidStatus);
        }
        if state.disclosed {
            return Ok(());
        }

        state.disclosed = true;
        storage::save_audit_state(&env, audit_id, &state);

        events::report_disclosed(&env, audit_id, project);
        Ok(())
    }

    /// Contest a completed audit. Moves it to the terminal `Disputed` state.
    pub fn dispute_audit(env: Env, project: Address, audit_id: u64) -> Result<(), Error> {
        let config = storage::load_audit_config(&env, audit_id)?;
        access::require_project(&project, &config)?;

        let mut state = storage::load_audit_state(&env, audit_id)?;
        if state.status != AuditStatus::Completed {
            return Err(Error::InvalidStatus);
        }

        state.status = AuditStatus::Disputed;
        storage::save_audit_state(&env, audit_id, &state);

        events::audit_disputed(&env, audit_id, project);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_public_audit_info(env: Env, audit_id: u64) -> Result<PublicAuditInfo, Error> {
        let config = storage::load_audit_config(&env, audit_id)?;
        let state = storage::load_audit_state(&env, audit_id)?;
        let statuses = storage::load_finding_statuses(&env, audit_id)?;

        Ok(PublicAuditInfo {
            project: config.project,
            code_hash: config.code_hash,
            submitted_at: config.submitted_at,
            completed_at: state.completed_at,
            status: state.status,
            public_score: state.public_score,
            finding_count: statuses.len(),
            disclosed: state.disclosed,
        })
    }

    /// Finding counts per severity, disclosed or not.
    pub fn get_severity_breakdown(env: Env, audit_id: u64) -> Result<SeverityBreakdown, Error> {
        let statuses = storage::load_finding_statuses(&env, audit_id)?;
        let mut breakdown = SeverityBreakdown::default();
        for status in statuses.iter() {
            breakdown.record(status.severity);
        }
        Ok(breakdown)
    }

    /// Severity and flags of every finding, in creation order.
    pub fn get_findings(env: Env, audit_id: u64) -> Result<FindingFlags, Error> {
        let statuses = storage::load_finding_statuses(&env, audit_id)?;
        let mut flags = FindingFlags {
            severities: Vec::new(&env),
            resolved: Vec::new(&env),
            disclosed: Vec::new(&env),
        };
        for status in statuses.iter() {
            flags.severities.push_back(status.severity);
            flags.resolved.push_back(status.resolved);
            flags.disclosed.push_back(status.disclosed);
        }
        Ok(flags)
    }

    /// Integrity digest of one finding, for checking decrypted content
    /// off-chain.
    pub fn get_finding_hash(env: Env, audit_id: u64, finding_index: u32) -> Result<BytesN<32>, Error> {
        storage::load_audit_config(&env, audit_id)?;
        Ok(storage::load_finding(&env, audit_id, finding_index)?.finding_hash)
    }

    pub fn get_audit_auditor(env: Env, audit_id: u64) -> Result<Option<Address>, Error> {
        Ok(storage::load_audit_state(&env, audit_id)?.auditor)
    }

    /// Audit ids submitted by `project`, in submission order.
    pub fn get_project_audits(env: Env, project: Address) -> Vec<u64> {
        storage::load_project_audits(&env, &project)
    }

    /// Number of audits created so far, which is also the next id.
    pub fn next_audit_id(env: Env) -> u64 {
        storage::audit_count(&env)
    }

    pub fn auditor_reputation(env: Env, auditor: Address) -> u64 {
        storage::load_auditor(&env, &auditor).reputation
    }

    pub fn registered_auditors(env: Env, auditor: Address) -> bool {
        storage::load_auditor(&env, &auditor).registered
    }
}
