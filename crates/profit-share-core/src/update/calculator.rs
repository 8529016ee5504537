use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::params::AdjustmentParameters;
use crate::types::{round_money, BadgeNumber, Money, Points, Rate};

/// A formula amount before and after an operator override delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideApplied {
    pub unadjusted: Money,
    pub adjusted: Money,
}

/// Percentage-of-points amount, rounded to cents.
pub fn formula_amount(percent: Rate, points: Points) -> Money {
    round_money(percent * Decimal::from(points))
}

/// Add an override delta to `amount` when one applies, recording both values.
pub fn apply_override(amount: Money, delta: Option<Money>) -> (Money, Option<OverrideApplied>) {
    match delta {
        Some(delta) => {
            let adjusted = amount + delta;
            (
                adjusted,
                Some(OverrideApplied {
                    unadjusted: amount,
                    adjusted,
                }),
            )
        }
        None => (amount, None),
    }
}

/// Contribution and incoming forfeiture for one employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionAllocation {
    pub contribution: Money,
    pub incoming_forfeiture: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contribution_override: Option<OverrideApplied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forfeiture_override: Option<OverrideApplied>,
}

/// Contribution and incoming forfeiture from the member's points, with the
/// primary override applied when it targets this badge.
pub fn compute_contribution_allocation(
    params: &AdjustmentParameters,
    badge_number: BadgeNumber,
    points_earned: Points,
) -> ContributionAllocation {
    let target = params.primary_for(badge_number);

    let (contribution, contribution_override) = apply_override(
        formula_amount(params.contribution_percent, points_earned),
        target.map(|o| o.contribution_delta),
    );
    let (incoming_forfeiture, forfeiture_override) = apply_override(
        formula_amount(params.incoming_forfeit_percent, points_earned),
        target.map(|o| o.forfeiture_delta),
    );

    ContributionAllocation {
        contribution,
        incoming_forfeiture,
        contribution_override,
        forfeiture_override,
    }
}
