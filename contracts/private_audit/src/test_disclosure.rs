extern crate std;

use soroban_sdk::{testutils::Address as _, Address, Bytes, BytesN, Env, String};

use crate::invariants;
use crate::storage;
use crate::{AuditRegistry, AuditRegistryClient, AuditStatus, Error, Severity};

struct Audit {
    id: u64,
    project: Address,
    auditor: Address,
}

fn setup() -> (Env, AuditRegistryClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(AuditRegistry, ());
    let client = AuditRegistryClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    client.init(&owner);
    (env, client, owner)
}

fn blob(env: &Env, text: &str) -> Bytes {
    Bytes::from_slice(env, text.as_bytes())
}

/// An in-progress audit carrying `findings` findings (High severity).
fn audit_with_findings(
    env: &Env,
    client: &AuditRegistryClient,
    owner: &Address,
    findings: u32,
) -> Audit {
    let project = Address::generate(env);
    let auditor = Address::generate(env);
    let id = client.request_audit(
        &project,
        &String::from_str(env, "https://github.com/acme/vault"),
        &BytesN::from_array(env, &[0x42; 32]),
    );
    client.register_auditor(owner, &auditor);
    client.assign_auditor(owner, &id, &auditor);
    for _ in 0..findings {
        client.add_finding(
            &auditor,
            &id,
            &(Severity::High as u32),
            &blob(env, "enc-title"),
            &blob(env, "enc-desc"),
            &BytesN::from_array(env, &[0x07; 32]),
        );
    }
    Audit {
        id,
        project,
        auditor,
    }
}

fn complete(env: &Env, client: &AuditRegistryClient, audit: &Audit) {
    client.complete_audit(&audit.auditor, &audit.id, &88, &blob(env, "report"));
}

// ─────────────────────────────────────────────────────────
// disclose_full_report
// ─────────────────────────────────────────────────────────

#[test]
fn test_disclose_full_report_before_completion_fails() {
    let (env, client, owner) = setup();
    let project = Address::generate(&env);
    let pending = client.request_audit(
        &project,
        &String::from_str(&env, "ipfs://Qm123"),
        &BytesN::from_array(&env, &[1; 32]),
    );
    assert_eq!(
        client.try_disclose_full_report(&project, &pending),
        Err(Ok(Error::InvalidStatus))
    );

    let audit = audit_with_findings(&env, &client, &owner, 1);
    assert_eq!(
        client.try_disclose_full_report(&audit.project, &audit.id),
        Err(Ok(Error::InvalidStatus))
    );
    assert!(!client.get_public_audit_info(&audit.id).disclosed);
}

#[test]
fn test_disclose_full_report_after_completion() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 2);
    complete(&env, &client, &audit);

    client.disclose_full_report(&audit.project, &audit.id);
    assert!(client.get_public_audit_info(&audit.id).disclosed);

    // Findings keep their own flags.
    let flags = client.get_findings(&audit.id);
    assert_eq!(flags.disclosed.get(0), Some(false));
    assert_eq!(flags.disclosed.get(1), Some(false));

    // Repeating is harmless and the flag never reverts.
    client.disclose_full_report(&audit.project, &audit.id);
    assert!(client.get_public_audit_info(&audit.id).disclosed);
}

#[test]
fn test_disclose_full_report_is_project_only() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 0);
    complete(&env, &client, &audit);

    for caller in [audit.auditor.clone(), owner.clone(), Address::generate(&env)] {
        assert_eq!(
            client.try_disclose_full_report(&caller, &audit.id),
            Err(Ok(Error::NotAuthorized))
        );
    }
    assert!(!client.get_public_audit_info(&audit.id).disclosed);
}

// ─────────────────────────────────────────────────────────
// resolve_finding
// ─────────────────────────────────────────────────────────

#[test]
fn test_resolve_finding_marks_only_that_finding() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 3);

    client.resolve_finding(&audit.project, &audit.id, &1);

    let flags = client.get_findings(&audit.id);
    assert_eq!(flags.resolved.get(0), Some(false));
    assert_eq!(flags.resolved.get(1), Some(true));
    assert_eq!(flags.resolved.get(2), Some(false));
    assert_eq!(flags.disclosed.get(1), Some(false));
}

#[test]
fn test_resolve_finding_twice_is_rejected_without_change() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);

    client.resolve_finding(&audit.project, &audit.id, &0);
    let before = client.get_findings(&audit.id);

    assert_eq!(
        client.try_resolve_finding(&audit.project, &audit.id, &0),
        Err(Ok(Error::FindingAlreadyResolved))
    );
    assert_eq!(client.get_findings(&audit.id), before);
}

#[test]
fn test_resolve_finding_rejections() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);

    assert_eq!(
        client.try_resolve_finding(&audit.auditor, &audit.id, &0),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        client.try_resolve_finding(&audit.project, &audit.id, &1),
        Err(Ok(Error::FindingNotFound))
    );
    assert_eq!(
        client.try_resolve_finding(&audit.project, &42, &0),
        Err(Ok(Error::AuditNotFound))
    );
    assert_eq!(client.get_findings(&audit.id).resolved.get(0), Some(false));
}

#[test]
fn test_remediation_continues_after_completion() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 2);
    complete(&env, &client, &audit);

    client.resolve_finding(&audit.project, &audit.id, &0);
    client.disclose_finding(&audit.project, &audit.id, &0);

    let info = client.get_public_audit_info(&audit.id);
    assert_eq!(info.status, AuditStatus::Completed);
    assert_eq!(info.public_score, 88);

    let flags = client.get_findings(&audit.id);
    assert_eq!(flags.resolved.get(0), Some(true));
    assert_eq!(flags.disclosed.get(0), Some(true));
    invariants::assert_disclosed_implies_resolved(&flags);
}

// ─────────────────────────────────────────────────────────
// disclose_finding
// ─────────────────────────────────────────────────────────

#[test]
fn test_disclose_finding_requires_resolution() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);

    assert_eq!(
        client.try_disclose_finding(&audit.project, &audit.id, &0),
        Err(Ok(Error::FindingNotResolved))
    );
    assert_eq!(client.get_findings(&audit.id).disclosed.get(0), Some(false));

    client.resolve_finding(&audit.project, &audit.id, &0);
    client.disclose_finding(&audit.project, &audit.id, &0);
    assert_eq!(client.get_findings(&audit.id).disclosed.get(0), Some(true));
}

#[test]
fn test_disclose_finding_twice_is_rejected_without_change() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);
    client.resolve_finding(&audit.project, &audit.id, &0);
    client.disclose_finding(&audit.project, &audit.id, &0);
    let before = client.get_findings(&audit.id);

    assert_eq!(
        client.try_disclose_finding(&audit.project, &audit.id, &0),
        Err(Ok(Error::FindingAlreadyDisclosed))
    );
    assert_eq!(client.get_findings(&audit.id), before);
}

#[test]
fn test_disclose_finding_rejections() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);
    client.resolve_finding(&audit.project, &audit.id, &0);

    assert_eq!(
        client.try_disclose_finding(&owner, &audit.id, &0),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        client.try_disclose_finding(&audit.project, &audit.id, &3),
        Err(Ok(Error::FindingNotFound))
    );
}

// ─────────────────────────────────────────────────────────
// Finding storage
// ─────────────────────────────────────────────────────────

#[test]
fn test_remediation_leaves_finding_content_untouched() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 3);
    complete(&env, &client, &audit);

    client.resolve_finding(&audit.project, &audit.id, &1);
    client.disclose_finding(&audit.project, &audit.id, &1);

    env.as_contract(&client.address, || {
        let finding = storage::load_finding(&env, audit.id, 1).unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.encrypted_title, blob(&env, "enc-title"));
        assert_eq!(finding.encrypted_description, blob(&env, "enc-desc"));

        let statuses = storage::load_finding_statuses(&env, audit.id).unwrap();
        assert_eq!(statuses.len(), 3);
        let status = statuses.get(1).unwrap();
        assert!(status.resolved && status.disclosed);
        assert!(!statuses.get(0).unwrap().resolved);
    });
}

#[test]
fn test_get_finding_hash() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 2);

    assert_eq!(
        client.get_finding_hash(&audit.id, &1),
        BytesN::from_array(&env, &[0x07; 32])
    );
    assert_eq!(
        client.try_get_finding_hash(&audit.id, &2),
        Err(Ok(Error::FindingNotFound))
    );
    assert_eq!(
        client.try_get_finding_hash(&99, &0),
        Err(Ok(Error::AuditNotFound))
    );
}

#[test]
fn test_large_audit_stays_remediable() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 0);
    let title = Bytes::from_slice(&env, &[0xab; 1024]);
    let description = Bytes::from_slice(&env, &[0xcd; 1024]);
    for _ in 0..40 {
        client.add_finding(
            &audit.auditor,
            &audit.id,
            &(Severity::Medium as u32),
            &title,
            &description,
            &BytesN::from_array(&env, &[0x09; 32]),
        );
    }
    complete(&env, &client, &audit);

    client.resolve_finding(&audit.project, &audit.id, &39);
    client.disclose_finding(&audit.project, &audit.id, &39);

    let flags = client.get_findings(&audit.id);
    assert_eq!(flags.severities.len(), 40);
    assert_eq!(flags.resolved.get(39), Some(true));
    assert_eq!(flags.disclosed.get(39), Some(true));
    assert_eq!(client.get_severity_breakdown(&audit.id).medium, 40);
    assert_eq!(client.get_public_audit_info(&audit.id).finding_count, 40);
    invariants::assert_disclosed_implies_resolved(&flags);
}

// ─────────────────────────────────────────────────────────
// dispute_audit
// ─────────────────────────────────────────────────────────

#[test]
fn test_dispute_only_from_completed() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);

    assert_eq!(
        client.try_dispute_audit(&audit.project, &audit.id),
        Err(Ok(Error::InvalidStatus))
    );

    complete(&env, &client, &audit);
    assert_eq!(
        client.try_dispute_audit(&audit.auditor, &audit.id),
        Err(Ok(Error::NotAuthorized))
    );

    let before = client.get_public_audit_info(&audit.id).status;
    client.dispute_audit(&audit.project, &audit.id);
    let info = client.get_public_audit_info(&audit.id);
    assert_eq!(info.status, AuditStatus::Disputed);
    assert_eq!(info.public_score, 88);
    invariants::assert_valid_status_transition(&before, &info.status);
}

#[test]
fn test_disputed_audit_is_terminal() {
    let (env, client, owner) = setup();
    let audit = audit_with_findings(&env, &client, &owner, 1);
    complete(&env, &client, &audit);
    client.dispute_audit(&audit.project, &audit.id);

    assert_eq!(
        client.try_dispute_audit(&audit.project, &audit.id),
        Err(Ok(Error::InvalidStatus))
    );
    assert_eq!(
        client.try_complete_audit(&audit.auditor, &audit.id, &10, &blob(&env, "r")),
        Err(Ok(Error::InvalidStatus))
    );
    assert_eq!(
        client.try_add_finding(
            &audit.auditor,
            &audit.id,
            &(Severity::Low as u32),
            &blob(&env, "t"),
            &blob(&env, "d"),
            &BytesN::from_array(&env, &[0; 32]),
        ),
        Err(Ok(Error::InvalidStatus))
    );
    assert_eq!(
        client.try_disclose_full_report(&audit.project, &audit.id),
        Err(Ok(Error::InvalidStatus))
    );
    assert_eq!(client.get_public_audit_info(&audit.id).finding_count, 1);
}
