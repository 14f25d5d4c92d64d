//! Caller authorization.
//!
//! Every mutating entry point receives the caller identity explicitly. The
//! helpers here first demand the caller's signature and then check that the
//! caller holds the role the operation needs:
//!
//! | Role      | Held by                                   | Operations                                  |
//! |-----------|-------------------------------------------|---------------------------------------------|
//! | Owner     | address passed to `init`                  | `register_auditor`, `assign_auditor`        |
//! | Auditor   | the auditor assigned to a specific audit  | `add_finding`, `complete_audit`             |
//! | Project   | the submitter of a specific audit         | `resolve_finding`, disclosures, disputes    |

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::types::{AuditConfig, AuditState};
use crate::Error;

pub fn require_owner(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    let owner = storage::get_owner(env)?;
    if *caller != owner {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// The caller must be the auditor assigned to this audit. An unassigned
/// audit has no auditor, so every caller is rejected.
pub fn require_assigned_auditor(caller: &Address, state: &AuditState) -> Result<(), Error> {
    caller.require_auth();
    match &state.auditor {
        Some(auditor) if auditor == caller => Ok(()),
        _ => Err(Error::NotAuthorized),
    }
}

pub fn require_project(caller: &Address, config: &AuditConfig) -> Result<(), Error> {
    caller.require_auth();
    if *caller != config.project {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}
