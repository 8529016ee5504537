use chrono::NaiveDateTime;
use pretty_assertions::assert_eq;
use profit_share_core::member::{MemberFinancialSnapshot, PlanStatus, ProfitDetail};
use profit_share_core::params::{AdjustmentParameters, PrimaryOverride, SecondaryOverride};
use profit_share_core::provider::{DetailTotalsProvider, InMemoryRoster};
use profit_share_core::update::detail_totals::{DetailTotals, DetailTotalsBatch};
use profit_share_core::update::{run_profit_share_update, run_with_providers, ProfitShareUpdateInput};
use profit_share_core::{ProfitShareError, ProfitShareResult, Ssn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

// ===========================================================================
// Fixtures
// ===========================================================================

fn generated_at() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-01-05 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn params() -> AdjustmentParameters {
    AdjustmentParameters {
        contribution_percent: dec!(15),
        incoming_forfeit_percent: dec!(0.876678),
        earnings_percent: dec!(9.280136),
        secondary_earnings_percent: dec!(0),
        max_allowed_contributions: dec!(57000),
        primary_override: None,
        secondary_override: None,
    }
}

fn employee(badge: u32, ssn: Ssn, name: &str, balance: Decimal, points: i64) -> MemberFinancialSnapshot {
    MemberFinancialSnapshot {
        badge_number: badge,
        ssn,
        name: name.into(),
        psn: None,
        enrolled: true,
        plan_status: PlanStatus::Normal,
        current_balance: balance,
        years_in_plan: 3,
        points_earned: points,
        etva_after_vesting: dec!(0),
        earnings: dec!(0),
        secondary_earnings: dec!(0),
    }
}

fn beneficiary(psn: u64, ssn: Ssn, name: &str, balance: Decimal) -> MemberFinancialSnapshot {
    MemberFinancialSnapshot {
        badge_number: 0,
        psn: Some(psn),
        enrolled: false,
        years_in_plan: 0,
        points_earned: 0,
        ..employee(0, ssn, name, balance, 0)
    }
}

fn row(ssn: Ssn, code: u8, iteration: u8) -> ProfitDetail {
    ProfitDetail {
        ssn,
        profit_year: 2025,
        profit_code: code,
        profit_year_iteration: iteration,
        contribution: dec!(0),
        earnings: dec!(0),
        forfeiture: dec!(0),
        remark: None,
    }
}

fn run_input(members: Vec<MemberFinancialSnapshot>, transactions: Vec<ProfitDetail>) -> ProfitShareUpdateInput {
    ProfitShareUpdateInput {
        profit_year: 2025,
        parameters: params(),
        members,
        transactions,
        generated_at: Some(generated_at()),
    }
}

// ===========================================================================
// Whole-run properties
// ===========================================================================

#[test]
fn test_zero_rates_reproduce_balances() {
    let mut input = run_input(
        vec![
            employee(700100, 1, "ADAMS, AL", dec!(12345.67), 500),
            employee(700200, 2, "BAKER, BO", dec!(0.01), 10),
            beneficiary(70010000001, 3, "CARTER, CY", dec!(999.99)),
        ],
        Vec::new(),
    );
    input.parameters.contribution_percent = dec!(0);
    input.parameters.incoming_forfeit_percent = dec!(0);
    input.parameters.earnings_percent = dec!(0);
    input.parameters.max_allowed_contributions = dec!(999_999_999);

    let out = run_profit_share_update(&input).unwrap();
    assert!(!out.result.rerun_needed);
    for (entry, member) in out.result.entries.iter().zip(&input.members) {
        assert_eq!(entry.ending_balance, member.current_balance);
        assert_eq!(entry.beginning_balance, member.current_balance);
    }
    assert_eq!(out.result.totals.ending_balance, out.result.totals.beginning_balance);
}

#[test]
fn test_realistic_member_allocation() {
    let out = run_profit_share_update(&run_input(
        vec![employee(700100, 1, "ADAMS, AL", dec!(25000), 1234)],
        vec![{
            let mut r = row(1, 1, 0);
            r.forfeiture = dec!(1000);
            r
        }],
    ))
    .unwrap();
    let entry = &out.result.entries[0];

    // 15 * 1234
    assert_eq!(entry.contribution, dec!(18510));
    // 0.876678 * 1234 = 1081.820652
    assert_eq!(entry.incoming_forfeiture, dec!(1081.82));
    // (25000 - 1000) / 100 = 240 points; 9.280136 * 240 = 2227.23264
    assert_eq!(entry.earning_points, 240);
    assert_eq!(entry.earnings, dec!(2227.23));
    // 25000 + 18510 + 2227.23 + 1081.82 - 1000
    assert_eq!(entry.ending_balance, dec!(45819.05));
}

#[test]
fn test_primary_override_adds_delta_exactly() {
    let mut input = run_input(vec![employee(700174, 1, "ADAMS, AL", dec!(10000), 2000)], Vec::new());
    input.parameters.contribution_percent = dec!(0.15);
    input.parameters.primary_override = Some(PrimaryOverride {
        badge_number: 700174,
        contribution_delta: dec!(44.77),
        forfeiture_delta: dec!(0),
        earnings_delta: dec!(0),
    });

    let out = run_profit_share_update(&input).unwrap();
    let adjustments = &out.result.adjustments;
    assert_eq!(adjustments.contribution.unadjusted, dec!(300));
    assert_eq!(
        adjustments.contribution.adjusted - adjustments.contribution.unadjusted,
        dec!(44.77)
    );
    assert_eq!(out.result.entries[0].contribution, dec!(344.77));
}

#[test]
fn test_one_member_matching_both_targets() {
    let mut input = run_input(vec![employee(700174, 1, "ADAMS, AL", dec!(10000), 100)], Vec::new());
    input.parameters.secondary_earnings_percent = dec!(1);
    input.parameters.primary_override = Some(PrimaryOverride {
        badge_number: 700174,
        contribution_delta: dec!(1),
        forfeiture_delta: dec!(2),
        earnings_delta: dec!(3),
    });
    input.parameters.secondary_override = Some(SecondaryOverride {
        badge_number: 700174,
        secondary_earnings_delta: dec!(4),
    });

    let out = run_profit_share_update(&input).unwrap();
    let adjustments = &out.result.adjustments;
    assert!(adjustments.primary_matched);
    assert!(adjustments.secondary_matched);
    assert_eq!(adjustments.earnings.adjusted - adjustments.earnings.unadjusted, dec!(3));
    // 1 * 100 earn points + 4
    assert_eq!(adjustments.secondary_earnings.adjusted, dec!(104));
    assert_eq!(out.result.entries[0].secondary_earnings, dec!(104));
}

// ===========================================================================
// Contribution cap
// ===========================================================================

#[test]
fn test_overage_less_than_forfeiture() {
    let mut input = run_input(vec![employee(700100, 1, "ADAMS, AL", dec!(0), 3800)], Vec::new());
    input.parameters.incoming_forfeit_percent = dec!(1);
    // contribution 57000, forfeiture 3800, military 0; cap 60000 -> overage 800
    input.parameters.max_allowed_contributions = dec!(60000);

    let out = run_profit_share_update(&input).unwrap();
    let entry = &out.result.entries[0];
    assert_eq!(entry.incoming_forfeiture, dec!(3000));
    assert_eq!(entry.cap_overage, dec!(800));
    assert!(out.result.rerun_needed);
    assert!(!out.warnings.iter().any(|w| w.starts_with("FORFEITURES NOT ENOUGH")));
}

#[test]
fn test_overage_greater_than_forfeiture() {
    let mut military = row(1, 0, 1);
    military.contribution = dec!(5000);
    let mut input = run_input(vec![employee(700100, 1, "ADAMS, AL", dec!(0), 3800)], vec![military]);
    input.parameters.incoming_forfeit_percent = dec!(1);

    let out = run_profit_share_update(&input).unwrap();
    // 57000 + 5000 + 3800 - 57000 = 8800 overage
    let entry = &out.result.entries[0];
    assert_eq!(entry.incoming_forfeiture, dec!(0));
    assert_eq!(out.result.totals.max_over, dec!(8800));
    assert_eq!(out.result.totals.max_points, 3800);
    assert!(out.result.rerun_needed);
    assert!(out
        .warnings
        .iter()
        .any(|w| w == "FORFEITURES NOT ENOUGH FOR AMOUNT OVER MAX FOR EMPLOYEE BADGE #700100"));
}

#[test]
fn test_rerun_flag_survives_later_members() {
    let mut input = run_input(
        vec![
            employee(700100, 1, "ADAMS, AL", dec!(0), 4000),
            employee(700200, 2, "BAKER, BO", dec!(100), 1),
        ],
        Vec::new(),
    );
    input.parameters.max_allowed_contributions = dec!(100);
    let out = run_profit_share_update(&input).unwrap();
    assert!(out.result.rerun_needed);
    assert_eq!(out.result.rerun.members_over, vec![700100]);
}

// ===========================================================================
// Members and ETVA
// ===========================================================================

#[test]
fn test_etva_only_employee_promoted_and_prorated() {
    let mut member = employee(700300, 1, "DAVIS, DI", dec!(0), 0);
    member.enrolled = false;
    member.years_in_plan = 2;
    member.etva_after_vesting = dec!(5000);

    let mut incoming = row(1, 6, 0);
    incoming.contribution = dec!(10000);

    let out = run_profit_share_update(&run_input(vec![member], vec![incoming])).unwrap();
    let entry = &out.result.entries[0];
    assert_eq!(entry.plan_status, PlanStatus::EtvaBeneficiary);
    // earn points 100; earnings 928.01 (9.280136 * 100 = 928.0136)
    // scale 5000 / 10000 = 0.5; 928.01 * 0.5 = 464.005 -> 464.01
    assert_eq!(entry.earnings_on_etva, dec!(464.01));
    assert_eq!(entry.earnings, dec!(464.00));
    assert_eq!(entry.all_earnings(), dec!(928.01));
    assert!(out.result.etva_updates.is_empty());
}

#[test]
fn test_beneficiary_duplicate_of_employee_skipped() {
    let out = run_profit_share_update(&run_input(
        vec![
            beneficiary(70010000001, 1, "ADAMS, AL", dec!(100)),
            employee(700100, 1, "ADAMS, AL", dec!(100), 10),
            beneficiary(70020000001, 2, "BAKER, BO", dec!(100)),
        ],
        Vec::new(),
    ))
    .unwrap();
    let ids: Vec<u64> = out.result.entries.iter().map(|e| e.sort_id()).collect();
    assert_eq!(ids, vec![700100, 70020000001]);
    assert_eq!(out.result.members_skipped, 1);
}

#[test]
fn test_malformed_remark_fails_before_any_member() {
    let mut bad = row(2, 9, 0);
    bad.forfeiture = dec!(10);
    bad.remark = Some("QDRO".into());
    let err = run_profit_share_update(&run_input(
        vec![employee(700100, 1, "ADAMS, AL", dec!(100), 10), employee(700200, 2, "BAKER, BO", dec!(100), 10)],
        vec![bad],
    ))
    .unwrap_err();
    match err {
        ProfitShareError::MalformedRemark { ssn, profit_code, .. } => {
            assert_eq!(ssn, 2);
            assert_eq!(profit_code, 9);
        }
        other => panic!("Expected MalformedRemark, got {other:?}"),
    }
}

// ===========================================================================
// Providers
// ===========================================================================

struct FixedTotals(HashMap<Ssn, DetailTotals>);

impl DetailTotalsProvider for FixedTotals {
    fn detail_totals(&self, _profit_year: u16, ssns: &[Ssn]) -> ProfitShareResult<DetailTotalsBatch> {
        let totals = ssns
            .iter()
            .filter_map(|ssn| self.0.get(ssn).map(|t| (*ssn, t.clone())))
            .collect();
        Ok(DetailTotalsBatch::new(totals))
    }
}

struct FailingTotals;

impl DetailTotalsProvider for FailingTotals {
    fn detail_totals(&self, _profit_year: u16, _ssns: &[Ssn]) -> ProfitShareResult<DetailTotalsBatch> {
        Err(ProfitShareError::Provider("totals store unavailable".into()))
    }
}

#[test]
fn test_external_totals_provider() {
    let roster = InMemoryRoster::new(vec![employee(700100, 1, "ADAMS, AL", dec!(1000), 0)]);
    let totals = FixedTotals(HashMap::from([(
        1,
        DetailTotals {
            distributions: dec!(400),
            ..Default::default()
        },
    )]));
    let out = run_with_providers(2025, &params(), &roster, &totals, generated_at()).unwrap();
    let entry = &out.result.entries[0];
    assert_eq!(entry.distributions, dec!(400));
    // (1000 - 400) / 100 = 6 points
    assert_eq!(entry.earning_points, 6);
}

#[test]
fn test_provider_failure_propagates() {
    let roster = InMemoryRoster::new(vec![employee(700100, 1, "ADAMS, AL", dec!(1000), 0)]);
    assert!(matches!(
        run_with_providers(2025, &params(), &roster, &FailingTotals, generated_at()),
        Err(ProfitShareError::Provider(_))
    ));
}

// ===========================================================================
// Serialized input
// ===========================================================================

#[test]
fn test_run_from_json_document() {
    let json = r#"{
        "profit_year": 2025,
        "generated_at": "2026-01-05T09:30:00",
        "parameters": {
            "contribution_percent": "15",
            "incoming_forfeit_percent": "1",
            "earnings_percent": "5",
            "max_allowed_contributions": "57000",
            "primary_override": { "badge_number": 700100, "contribution_delta": "10" }
        },
        "members": [
            { "badge_number": 700100, "ssn": 1, "name": "ADAMS, AL", "enrolled": true,
              "current_balance": "1000", "points_earned": 10 }
        ],
        "transactions": [
            { "ssn": 1, "profit_year": 2025, "profit_code": 9, "forfeiture": "50",
              "remark": "XFER > 700200" }
        ]
    }"#;
    let input: ProfitShareUpdateInput = serde_json::from_str(json).unwrap();
    let out = run_profit_share_update(&input).unwrap();
    let entry = &out.result.entries[0];
    assert_eq!(entry.contribution, dec!(160));
    assert_eq!(entry.paid_transfer, dec!(50));
    assert_eq!(out.result.generated_at, generated_at());
}
