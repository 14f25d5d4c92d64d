#![allow(dead_code)]

extern crate std;

use crate::types::{AuditStatus, FindingFlags, PublicAuditInfo, SeverityBreakdown};

/// INV-1: Severity counts sum to the finding count.
pub fn assert_breakdown_matches_count(info: &PublicAuditInfo, breakdown: &SeverityBreakdown) {
    assert_eq!(
        breakdown.total(),
        info.finding_count,
        "INV-1 violated: severity breakdown sums to {} but finding_count is {}",
        breakdown.total(),
        info.finding_count
    );
}

/// INV-2: Public score never exceeds 100.
pub fn assert_score_in_range(info: &PublicAuditInfo) {
    assert!(
        info.public_score <= crate::MAX_PUBLIC_SCORE,
        "INV-2 violated: public score {} out of range",
        info.public_score
    );
}

/// INV-3: Score and completion time stay zero until the audit is completed.
pub fn assert_unset_before_completion(info: &PublicAuditInfo) {
    if matches!(info.status, AuditStatus::Pending | AuditStatus::InProgress) {
        assert_eq!(info.public_score, 0, "INV-3 violated: score set before completion");
        assert_eq!(
            info.completed_at, 0,
            "INV-3 violated: completed_at set before completion"
        );
        assert!(!info.disclosed, "INV-3 violated: report disclosed before completion");
    }
}

/// INV-4: The three vectors of `get_findings` have one entry per finding.
pub fn assert_flags_aligned(info: &PublicAuditInfo, flags: &FindingFlags) {
    assert_eq!(flags.severities.len(), info.finding_count, "INV-4 violated: severities");
    assert_eq!(flags.resolved.len(), info.finding_count, "INV-4 violated: resolved");
    assert_eq!(flags.disclosed.len(), info.finding_count, "INV-4 violated: disclosed");
}

/// INV-5: A finding is never disclosed without being resolved.
pub fn assert_disclosed_implies_resolved(flags: &FindingFlags) {
    for i in 0..flags.disclosed.len() {
        if flags.disclosed.get(i).unwrap_or(false) {
            assert!(
                flags.resolved.get(i).unwrap_or(false),
                "INV-5 violated: finding {} disclosed while unresolved",
                i
            );
        }
    }
}

/// INV-6: Status transitions only move forward:
///   Pending    -> InProgress
///   InProgress -> Completed
///   Completed  -> Disputed
pub fn assert_valid_status_transition(from: &AuditStatus, to: &AuditStatus) {
    let valid = matches!(
        (from, to),
        (AuditStatus::Pending, AuditStatus::InProgress)
            | (AuditStatus::InProgress, AuditStatus::Completed)
            | (AuditStatus::Completed, AuditStatus::Disputed)
    );

    assert!(
        valid,
        "INV-6 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-7: Fields fixed at request time never change.
pub fn assert_immutable_fields(original: &PublicAuditInfo, current: &PublicAuditInfo) {
    assert_eq!(original.project, current.project, "INV-7 violated: project changed");
    assert_eq!(original.code_hash, current.code_hash, "INV-7 violated: code_hash changed");
    assert_eq!(
        original.submitted_at, current.submitted_at,
        "INV-7 violated: submitted_at changed"
    );
}

/// INV-8: Audit ids are sequential starting from 0.
pub fn assert_sequential_ids(ids: &[u64]) {
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(*id, i as u64, "INV-8 violated: expected id {}, got {}", i, id);
    }
}

/// Run all stateless invariants over one audit's public view.
pub fn assert_all_audit_invariants(
    info: &PublicAuditInfo,
    breakdown: &SeverityBreakdown,
    flags: &FindingFlags,
) {
    assert_breakdown_matches_count(info, breakdown);
    assert_score_in_range(info);
    assert_unset_before_completion(info);
    assert_flags_aligned(info, flags);
    assert_disclosed_implies_resolved(flags);
}
