use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProfitShareError;
use crate::types::{BadgeNumber, Money, Rate};
use crate::ProfitShareResult;

/// Operator override for one employee's contribution, incoming forfeiture and
/// earnings. Deltas are added after the percentage formulas are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryOverride {
    pub badge_number: BadgeNumber,
    #[serde(default)]
    pub contribution_delta: Money,
    #[serde(default)]
    pub forfeiture_delta: Money,
    #[serde(default)]
    pub earnings_delta: Money,
}

/// Operator override for one employee's secondary earnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryOverride {
    pub badge_number: BadgeNumber,
    #[serde(default)]
    pub secondary_earnings_delta: Money,
}

/// Global inputs to one profit share update run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentParameters {
    /// Dollars allocated per contribution point.
    pub contribution_percent: Rate,
    /// Dollars of incoming forfeiture allocated per contribution point.
    pub incoming_forfeit_percent: Rate,
    /// Dollars of earnings allocated per earning point.
    pub earnings_percent: Rate,
    #[serde(default)]
    pub secondary_earnings_percent: Rate,
    /// Ceiling on contribution + military + forfeiture for any one member.
    pub max_allowed_contributions: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_override: Option<PrimaryOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_override: Option<SecondaryOverride>,
}

impl AdjustmentParameters {
    pub fn validate(&self) -> ProfitShareResult<()> {
        let percents = [
            ("contribution_percent", self.contribution_percent),
            ("incoming_forfeit_percent", self.incoming_forfeit_percent),
            ("earnings_percent", self.earnings_percent),
            ("secondary_earnings_percent", self.secondary_earnings_percent),
        ];
        for (field, value) in percents {
            if value < Decimal::ZERO {
                return Err(ProfitShareError::InvalidInput {
                    field: field.into(),
                    reason: "Cannot be negative".into(),
                });
            }
        }
        if self.max_allowed_contributions < Decimal::ZERO {
            return Err(ProfitShareError::InvalidInput {
                field: "max_allowed_contributions".into(),
                reason: "Cannot be negative".into(),
            });
        }
        if matches!(&self.primary_override, Some(o) if o.badge_number == 0) {
            return Err(ProfitShareError::InvalidInput {
                field: "primary_override.badge_number".into(),
                reason: "Override target must be a positive badge number".into(),
            });
        }
        if matches!(&self.secondary_override, Some(o) if o.badge_number == 0) {
            return Err(ProfitShareError::InvalidInput {
                field: "secondary_override.badge_number".into(),
                reason: "Override target must be a positive badge number".into(),
            });
        }
        Ok(())
    }

    /// The primary override, if it targets this badge. Beneficiaries (badge 0)
    /// never match.
    pub fn primary_for(&self, badge_number: BadgeNumber) -> Option<&PrimaryOverride> {
        self.primary_override
            .as_ref()
            .filter(|o| badge_number > 0 && o.badge_number == badge_number)
    }

    pub fn secondary_for(&self, badge_number: BadgeNumber) -> Option<&SecondaryOverride> {
        self.secondary_override
            .as_ref()
            .filter(|o| badge_number > 0 && o.badge_number == badge_number)
    }

    pub fn has_overrides(&self) -> bool {
        self.primary_override.is_some() || self.secondary_override.is_some()
    }
}
