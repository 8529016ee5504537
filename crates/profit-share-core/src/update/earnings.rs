use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::member::MemberFinancialSnapshot;
use crate::params::AdjustmentParameters;
use crate::types::{round_money, round_points, BadgeNumber, Money, Points, Ssn};
use crate::update::calculator::{apply_override, formula_amount, OverrideApplied};
use crate::update::detail_totals::DetailTotals;

/// Years in plan at which a member is fully vested and the ETVA carry ends.
pub const FULL_VESTING_YEARS: u32 = 6;

/// Balance on which earnings are allocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsBasis {
    pub earnings_balance: Money,
    pub points_dollars: Money,
    pub earn_points: Points,
}

/// Earnings basis for a member. Class action is added and then removed again;
/// the legacy calculation does exactly this and the order is kept.
pub fn earnings_basis(current_balance: Money, totals: &DetailTotals) -> EarningsBasis {
    let mut earnings_balance = totals.allocations
        + totals.class_action
        + (current_balance - totals.forfeits - totals.paid_allocations)
        - totals.distributions;
    earnings_balance -= totals.class_action;

    if earnings_balance <= Decimal::ZERO {
        return EarningsBasis {
            earnings_balance,
            points_dollars: Decimal::ZERO,
            earn_points: 0,
        };
    }

    let points_dollars = round_money(earnings_balance);
    EarningsBasis {
        earnings_balance,
        points_dollars,
        earn_points: round_points(points_dollars / dec!(100)),
    }
}

/// The stored ETVA reset for a member who is past the vesting window. Returned
/// to the caller instead of being written back to the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtvaUpdate {
    pub badge_number: BadgeNumber,
    pub ssn: Ssn,
    pub previous_etva: Money,
    pub updated_etva: Money,
}

/// ETVA amount that earnings are prorated against, and any reset of the stored value.
pub fn etva_adjustment(
    member: &MemberFinancialSnapshot,
    class_action: Money,
) -> (Money, Option<EtvaUpdate>) {
    if member.is_beneficiary() || member.etva_after_vesting <= Decimal::ZERO {
        return (Decimal::ZERO, None);
    }
    if member.years_in_plan < FULL_VESTING_YEARS {
        return (member.etva_after_vesting - class_action, None);
    }
    (
        Decimal::ZERO,
        Some(EtvaUpdate {
            badge_number: member.badge_number,
            ssn: member.ssn,
            previous_etva: member.etva_after_vesting,
            updated_etva: Decimal::ZERO,
        }),
    )
}

/// Earnings split between the regular balance and the ETVA carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsSplit {
    /// Earnings on the non-ETVA part of the balance.
    pub earnings: Money,
    pub earnings_on_etva: Money,
    pub secondary_earnings: Money,
    pub secondary_earnings_on_etva: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_override: Option<OverrideApplied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_override: Option<OverrideApplied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etva_update: Option<EtvaUpdate>,
}

impl EarningsSplit {
    pub fn all_earnings(&self) -> Money {
        self.earnings + self.earnings_on_etva
    }

    pub fn all_secondary_earnings(&self) -> Money {
        self.secondary_earnings + self.secondary_earnings_on_etva
    }
}

/// Move `round(amount * scale)` out of `amount`, returning (remaining, moved).
fn prorate(amount: Money, scale: Decimal) -> (Money, Money) {
    let scaled = round_money(amount * scale);
    (amount - scaled, scaled)
}

/// Earnings for an employee, prorated against the ETVA carry.
pub fn compute_employee_earnings(
    params: &AdjustmentParameters,
    member: &MemberFinancialSnapshot,
    basis: &EarningsBasis,
    class_action: Money,
) -> EarningsSplit {
    let (earnings, earnings_override) = apply_override(
        formula_amount(params.earnings_percent, basis.earn_points),
        params.primary_for(member.badge_number).map(|o| o.earnings_delta),
    );
    let (secondary, secondary_override) = apply_override(
        formula_amount(params.secondary_earnings_percent, basis.earn_points),
        params
            .secondary_for(member.badge_number)
            .map(|o| o.secondary_earnings_delta),
    );
    let (etva_adj, etva_update) = etva_adjustment(member, class_action);

    let mut split = EarningsSplit {
        earnings,
        secondary_earnings: secondary,
        earnings_override,
        secondary_override,
        etva_update,
        ..Default::default()
    };

    if etva_adj <= Decimal::ZERO || basis.points_dollars <= Decimal::ZERO {
        return split;
    }

    let scale = etva_adj / basis.points_dollars;
    (split.earnings, split.earnings_on_etva) = prorate(earnings, scale);
    if !params.secondary_earnings_percent.is_zero() {
        (split.secondary_earnings, split.secondary_earnings_on_etva) = prorate(secondary, scale);
    }
    split
}

/// Earnings for a beneficiary. Beneficiaries hold no ETVA and cannot be override
/// targets; secondary earnings keep the carried value unless a secondary rate is set.
pub fn compute_beneficiary_earnings(
    params: &AdjustmentParameters,
    member: &MemberFinancialSnapshot,
    basis: &EarningsBasis,
) -> EarningsSplit {
    let secondary_earnings = if params.secondary_earnings_percent.is_zero() {
        member.secondary_earnings
    } else {
        formula_amount(params.secondary_earnings_percent, basis.earn_points)
    };

    EarningsSplit {
        earnings: formula_amount(params.earnings_percent, basis.earn_points),
        secondary_earnings,
        ..Default::default()
    }
}
