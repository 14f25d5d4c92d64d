//! Contract events.
//!
//! Every audit event is published with the topic tuple `(symbol, audit_id)`
//! and one of the structs below as data, so off-chain indexers can filter by
//! audit without decoding the payload.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

use crate::types::Severity;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditRequested {
    pub audit_id: u64,
    pub project: Address,
    pub code_hash: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditorAssigned {
    pub audit_id: u64,
    pub auditor: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FindingAdded {
    pub audit_id: u64,
    pub index: u32,
    pub severity: Severity,
    pub finding_hash: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditCompleted {
    pub audit_id: u64,
    pub public_score: u32,
    pub finding_count: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FindingResolved {
    pub audit_id: u64,
    pub index: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FindingDisclosed {
    pub audit_id: u64,
    pub index: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportDisclosed {
    pub audit_id: u64,
    pub project: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditDisputed {
    pub audit_id: u64,
    pub project: Address,
}

pub fn audit_requested(env: &Env, audit_id: u64, project: Address, code_hash: BytesN<32>) {
    env.events().publish(
        (symbol_short!("requested"), audit_id),
        AuditRequested {
            audit_id,
            project,
            code_hash,
        },
    );
}

pub fn auditor_assigned(env: &Env, audit_id: u64, auditor: Address) {
    env.events().publish(
        (symbol_short!("assigned"), audit_id),
        AuditorAssigned { audit_id, auditor },
    );
}

pub fn finding_added(
    env: &Env,
    audit_id: u64,
    index: u32,
    severity: Severity,
    finding_hash: BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("finding"), audit_id),
        FindingAdded {
            audit_id,
            index,
            severity,
            finding_hash,
        },
    );
}

pub fn audit_completed(env: &Env, audit_id: u64, public_score: u32, finding_count: u32) {
    env.events().publish(
        (symbol_short!("completed"), audit_id),
        AuditCompleted {
            audit_id,
            public_score,
            finding_count,
        },
    );
}

pub fn finding_resolved(env: &Env, audit_id: u64, index: u32) {
    env.events().publish(
        (symbol_short!("resolved"), audit_id),
        FindingResolved { audit_id, index },
    );
}

pub fn finding_disclosed(env: &Env, audit_id: u64, index: u32) {
    env.events().publish(
        (symbol_short!("fdisclose"), audit_id),
        FindingDisclosed { audit_id, index },
    );
}

pub fn report_disclosed(env: &Env, audit_id: u64, project: Address) {
    env.events().publish(
        (symbol_short!("disclosed"), audit_id),
        ReportDisclosed { audit_id, project },
    );
}

pub fn audit_disputed(env: &Env, audit_id: u64, project: Address) {
    env.events().publish(
        (symbol_short!("disputed"), audit_id),
        AuditDisputed { audit_id, project },
    );
}

/// Published the first time an identity is registered as an auditor.
pub fn auditor_registered(env: &Env, auditor: Address) {
    env.events()
        .publish((symbol_short!("aud_reg"), auditor.clone()), auditor);
}
