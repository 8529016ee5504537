use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BadgeNumber, Money, Points, Psn, Ssn};

/// Participation status carried on the member record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Normal,
    NewInPlan,
    /// Employee with an ETVA balance but no current amount; earns only on ETVA.
    EtvaBeneficiary,
    /// Non-employee beneficiary identified by PSN.
    Beneficiary,
}

impl PlanStatus {
    /// Three-character flag printed on report lines.
    pub fn report_flag(&self) -> &'static str {
        match self {
            PlanStatus::Normal => "",
            PlanStatus::NewInPlan => "NEW",
            PlanStatus::EtvaBeneficiary | PlanStatus::Beneficiary => "BEN",
        }
    }
}

/// A member's year-start position, as supplied by the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFinancialSnapshot {
    /// Employee badge; 0 for beneficiaries.
    #[serde(default)]
    pub badge_number: BadgeNumber,
    pub ssn: Ssn,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psn: Option<Psn>,
    #[serde(default)]
    pub enrolled: bool,
    #[serde(default)]
    pub plan_status: PlanStatus,
    #[serde(default)]
    pub current_balance: Money,
    #[serde(default)]
    pub years_in_plan: u32,
    #[serde(default)]
    pub points_earned: Points,
    /// Early-termination vested amount after vesting rules.
    #[serde(default)]
    pub etva_after_vesting: Money,
    #[serde(default)]
    pub earnings: Money,
    #[serde(default)]
    pub secondary_earnings: Money,
}

impl MemberFinancialSnapshot {
    pub fn is_beneficiary(&self) -> bool {
        self.badge_number == 0
    }

    /// Badge for employees, PSN for beneficiaries.
    pub fn sort_id(&self) -> u64 {
        if self.is_beneficiary() {
            self.psn.unwrap_or(0)
        } else {
            u64::from(self.badge_number)
        }
    }

    /// Status after applying the ETVA-beneficiary rule: a normal employee with
    /// ETVA but nothing in the current balance earns only on the ETVA.
    pub fn effective_status(&self) -> PlanStatus {
        if self.is_beneficiary() {
            return PlanStatus::Beneficiary;
        }
        if self.plan_status == PlanStatus::Normal
            && self.etva_after_vesting > Decimal::ZERO
            && self.current_balance.is_zero()
        {
            return PlanStatus::EtvaBeneficiary;
        }
        self.plan_status
    }

    /// Whether the member takes part in this year's update at all.
    pub fn qualifies(&self) -> bool {
        self.enrolled
            || self.effective_status() != PlanStatus::Normal
            || self.current_balance > Decimal::ZERO
            || self.years_in_plan > 0
    }
}

/// One profit detail row for a member and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitDetail {
    pub ssn: Ssn,
    pub profit_year: u16,
    pub profit_code: u8,
    #[serde(default)]
    pub profit_year_iteration: u8,
    #[serde(default)]
    pub contribution: Money,
    #[serde(default)]
    pub earnings: Money,
    #[serde(default)]
    pub forfeiture: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn employee() -> MemberFinancialSnapshot {
        MemberFinancialSnapshot {
            badge_number: 700174,
            ssn: 123456789,
            name: "SMITH, JOHN".into(),
            psn: None,
            enrolled: false,
            plan_status: PlanStatus::Normal,
            current_balance: dec!(0),
            years_in_plan: 0,
            points_earned: 0,
            etva_after_vesting: dec!(0),
            earnings: dec!(0),
            secondary_earnings: dec!(0),
        }
    }

    #[test]
    fn test_idle_employee_does_not_qualify() {
        assert!(!employee().qualifies());
    }

    #[test]
    fn test_any_participation_signal_qualifies() {
        let mut e = employee();
        e.enrolled = true;
        assert!(e.qualifies());

        let mut e = employee();
        e.plan_status = PlanStatus::NewInPlan;
        assert!(e.qualifies());

        let mut e = employee();
        e.current_balance = dec!(0.01);
        assert!(e.qualifies());

        let mut e = employee();
        e.years_in_plan = 1;
        assert!(e.qualifies());
    }

    #[test]
    fn test_etva_only_employee_is_promoted() {
        let mut e = employee();
        e.etva_after_vesting = dec!(500);
        assert_eq!(e.effective_status(), PlanStatus::EtvaBeneficiary);
        assert!(e.qualifies());

        e.current_balance = dec!(10);
        assert_eq!(e.effective_status(), PlanStatus::Normal);
    }

    #[test]
    fn test_beneficiary_identity() {
        let mut b = employee();
        b.badge_number = 0;
        b.psn = Some(70017400001);
        assert!(b.is_beneficiary());
        assert_eq!(b.sort_id(), 70017400001);
        assert_eq!(b.effective_status(), PlanStatus::Beneficiary);
        assert!(b.qualifies());
    }

    #[test]
    fn test_report_flags() {
        assert_eq!(PlanStatus::Normal.report_flag(), "");
        assert_eq!(PlanStatus::NewInPlan.report_flag(), "NEW");
        assert_eq!(PlanStatus::EtvaBeneficiary.report_flag(), "BEN");
    }
}
