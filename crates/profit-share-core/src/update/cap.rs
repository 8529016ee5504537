use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BadgeNumber, Money, Points};

/// Result of checking one member against the contribution cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CapOutcome {
    WithinCap,
    /// Overage absorbed by reducing the incoming forfeiture.
    ForfeitureReduced { overage: Money },
    /// Overage at least as large as the forfeiture; forfeiture zeroed.
    ForfeitureExhausted { overage: Money },
}

impl CapOutcome {
    pub fn overage(&self) -> Money {
        match self {
            CapOutcome::WithinCap => Decimal::ZERO,
            CapOutcome::ForfeitureReduced { overage } | CapOutcome::ForfeitureExhausted { overage } => {
                *overage
            }
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, CapOutcome::WithinCap)
    }

    /// Ledger forfeiture after giving back the overage.
    pub fn apply(&self, ledger_forfeiture: Money) -> Money {
        match self {
            CapOutcome::WithinCap => ledger_forfeiture,
            CapOutcome::ForfeitureReduced { overage } => ledger_forfeiture - *overage,
            CapOutcome::ForfeitureExhausted { .. } => Decimal::ZERO,
        }
    }
}

/// Check `contribution + military + forfeiture` against `max_allowed`. The
/// forfeiture here is the calculated amount, before detail forfeits come off.
pub fn enforce_contribution_cap(
    contribution: Money,
    military: Money,
    forfeiture: Money,
    max_allowed: Money,
) -> CapOutcome {
    let total = contribution + military + forfeiture;
    if total <= max_allowed {
        return CapOutcome::WithinCap;
    }

    let overage = total - max_allowed;
    if overage < forfeiture {
        CapOutcome::ForfeitureReduced { overage }
    } else {
        CapOutcome::ForfeitureExhausted { overage }
    }
}

/// Run-level record of cap overages. Once raised the rerun flag stays raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerunFlag {
    raised: bool,
    pub over_total: Money,
    pub points_total: Points,
    pub members_over: Vec<BadgeNumber>,
}

impl RerunFlag {
    pub fn record(&mut self, badge_number: BadgeNumber, outcome: CapOutcome, points: Points) {
        if !outcome.is_over() {
            return;
        }
        self.raised = true;
        self.over_total += outcome.overage();
        self.points_total += points;
        self.members_over.push(badge_number);
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }
}
