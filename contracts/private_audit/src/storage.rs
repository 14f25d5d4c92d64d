//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by PrivateAudit:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key          | Type      | Description                        |
//! |--------------|-----------|------------------------------------|
//! | `Owner`      | `Address` | Registry owner set by `init`       |
//! | `AuditCount` | `u64`     | Auto-increment audit ID counter    |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                 | Type            | Description                       |
//! |---------------------|-----------------|-----------------------------------|
//! | `AudConfig(id)`     | `AuditConfig`   | Immutable audit configuration     |
//! | `AudState(id)`      | `AuditState`    | Mutable audit state               |
//! | `AudReport(id)`     | `Bytes`         | Encrypted report, set once        |
//! | `FindStatus(id)`    | `Vec<FindingStatus>` | Severity and flags, in order |
//! | `Finding(id, idx)`  | `Finding`       | Finding ciphertext, set once      |
//! | `ProjAudits(addr)`  | `Vec<u64>`      | Audit ids per project, in order   |
//! | `Auditor(addr)`     | `AuditorRecord` | Registration flag and reputation  |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Bytes, Env, Vec};

use crate::types::{AuditConfig, AuditState, AuditorRecord, Finding, FindingStatus};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Registry owner (Instance).
    Owner,
    /// Global auto-increment counter for audit IDs (Instance).
    AuditCount,
    AudConfig(u64),
    AudState(u64),
    AudReport(u64),
    FindStatus(u64),
    Finding(u64, u32),
    ProjAudits(Address),
    Auditor(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_owner(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Owner)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
    bump_instance(env);
}

pub fn get_owner(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

/// Number of audits created so far; also the next id to be assigned.
pub fn audit_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::AuditCount)
        .unwrap_or(0)
}

/// Reads, increments, and stores the audit counter.
/// Returns the ID to use for the *current* audit (pre-increment value).
pub fn get_and_increment_audit_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = audit_count(env);
    env.storage()
        .instance()
        .set(&DataKey::AuditCount, &(current + 1));
    current
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Write the immutable config and initial state of a freshly requested audit,
/// and append its id to the project's index.
pub fn save_new_audit(env: &Env, config: &AuditConfig) {
    let config_key = DataKey::AudConfig(config.id);
    let state_key = DataKey::AudState(config.id);
    let statuses_key = DataKey::FindStatus(config.id);

    env.storage().persistent().set(&config_key, config);
    env.storage()
        .persistent()
        .set(&state_key, &AuditState::new());
    env.storage()
        .persistent()
        .set(&statuses_key, &Vec::<FindingStatus>::new(env));
    bump_persistent(env, &config_key);
    bump_persistent(env, &state_key);
    bump_persistent(env, &statuses_key);

    let mut ids = load_project_audits(env, &config.project);
    ids.push_back(config.id);
    let index_key = DataKey::ProjAudits(config.project.clone());
    env.storage().persistent().set(&index_key, &ids);
    bump_persistent(env, &index_key);
}

pub fn load_audit_config(env: &Env, id: u64) -> Result<AuditConfig, Error> {
    let key = DataKey::AudConfig(id);
    let config: AuditConfig = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::AuditNotFound)?;
    bump_persistent(env, &key);
    Ok(config)
}

pub fn load_audit_state(env: &Env, id: u64) -> Result<AuditState, Error> {
    let key = DataKey::AudState(id);
    let state: AuditState = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::AuditNotFound)?;
    bump_persistent(env, &key);
    Ok(state)
}

pub fn save_audit_state(env: &Env, id: u64, state: &AuditState) {
    let key = DataKey::AudState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

pub fn save_audit_report(env: &Env, id: u64, report: &Bytes) {
    let key = DataKey::AudReport(id);
    env.storage().persistent().set(&key, report);
    bump_persistent(env, &key);
}

#[cfg(test)]
pub fn load_audit_report(env: &Env, id: u64) -> Option<Bytes> {
    env.storage().persistent().get(&DataKey::AudReport(id))
}

/// Severity and flags of every finding of an audit, in creation order.
pub fn load_finding_statuses(env: &Env, id: u64) -> Result<Vec<FindingStatus>, Error> {
    let key = DataKey::FindStatus(id);
    let statuses: Vec<FindingStatus> = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::AuditNotFound)?;
    bump_persistent(env, &key);
    Ok(statuses)
}

pub fn save_finding_statuses(env: &Env, id: u64, statuses: &Vec<FindingStatus>) {
    let key = DataKey::FindStatus(id);
    env.storage().persistent().set(&key, statuses);
    bump_persistent(env, &key);
}

pub fn save_finding(env: &Env, id: u64, index: u32, finding: &Finding) {
    let key = DataKey::Finding(id, index);
    env.storage().persistent().set(&key, finding);
    bump_persistent(env, &key);
}

pub fn load_finding(env: &Env, id: u64, index: u32) -> Result<Finding, Error> {
    let key = DataKey::Finding(id, index);
    let finding: Finding = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::FindingNotFound)?;
    bump_persistent(env, &key);
    Ok(finding)
}

pub fn load_project_audits(env: &Env, project: &Address) -> Vec<u64> {
    let key = DataKey::ProjAudits(project.clone());
    match env.storage().persistent().get(&key) {
        Some(ids) => {
            bump_persistent(env, &key);
            ids
        }
        None => Vec::new(env),
    }
}

/// Auditor entry, defaulting to unregistered with zero reputation.
pub fn load_auditor(env: &Env, auditor: &Address) -> AuditorRecord {
    let key = DataKey::Auditor(auditor.clone());
    match env.storage().persistent().get(&key) {
        Some(record) => {
            bump_persistent(env, &key);
            record
        }
        None => AuditorRecord::default(),
    }
}

pub fn save_auditor(env: &Env, auditor: &Address, record: &AuditorRecord) {
    let key = DataKey::Auditor(auditor.clone());
    env.storage().persistent().set(&key, record);
    bump_persistent(env, &key);
}
