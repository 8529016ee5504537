use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::member::{MemberFinancialSnapshot, PlanStatus};
use crate::types::{BadgeNumber, Money, Points, Psn, Ssn};
use crate::update::calculator::ContributionAllocation;
use crate::update::cap::CapOutcome;
use crate::update::detail_totals::DetailTotals;
use crate::update::earnings::{EarningsBasis, EarningsSplit};

/// One member's line of the profit share update.
///
/// Transfer and paid transfer are kept apart from contribution and military;
/// [`MemberLedgerEntry::display`] folds them together for printing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLedgerEntry {
    pub badge_number: BadgeNumber,
    pub ssn: Ssn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psn: Option<Psn>,
    pub name: String,
    pub plan_status: PlanStatus,
    pub beginning_balance: Money,
    pub distributions: Money,
    pub contribution: Money,
    pub military: Money,
    /// Calculated forfeiture less detail forfeits, after the cap.
    pub incoming_forfeiture: Money,
    pub earnings: Money,
    pub earnings_on_etva: Money,
    pub secondary_earnings: Money,
    pub secondary_earnings_on_etva: Money,
    pub class_action: Money,
    pub transfer: Money,
    pub paid_transfer: Money,
    pub contribution_points: Points,
    pub earning_points: Points,
    pub cap_overage: Money,
    pub cap_overage_points: Points,
    pub ending_balance: Money,
}

/// Report-facing amounts derived from a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerDisplay {
    pub contribution: Money,
    pub military: Money,
    pub incoming_forfeiture: Money,
    pub earnings: Money,
    pub secondary_earnings: Money,
    pub class_action: Money,
}

impl MemberLedgerEntry {
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

    pub fn all_earnings(&self) -> Money {
        self.earnings + self.earnings_on_etva
    }

    pub fn all_secondary_earnings(&self) -> Money {
        self.secondary_earnings + self.secondary_earnings_on_etva
    }

    /// Transfer folded into contribution; for employees paid transfer comes out
    /// of military. The entry itself is not touched.
    pub fn display(&self) -> LedgerDisplay {
        let military = if self.is_beneficiary() {
            self.military
        } else {
            self.military - self.paid_transfer
        };
        LedgerDisplay {
            contribution: self.contribution + self.transfer,
            military,
            incoming_forfeiture: self.incoming_forfeiture,
            earnings: self.all_earnings(),
            secondary_earnings: self.all_secondary_earnings(),
            class_action: self.class_action,
        }
    }

    fn compute_ending_balance(&self) -> Money {
        let view = self.display();
        self.beginning_balance
            + view.contribution
            + view.earnings
            + view.secondary_earnings
            + view.incoming_forfeiture
            + view.military
            + view.class_action
            - self.distributions
    }

    /// True when nothing on the line would print as non-zero.
    pub fn is_blank(&self) -> bool {
        [
            self.beginning_balance,
            self.distributions,
            self.contribution,
            self.transfer,
            self.paid_transfer,
            self.military,
            self.incoming_forfeiture,
            self.all_earnings(),
            self.all_secondary_earnings(),
        ]
        .iter()
        .all(|v| v.is_zero())
    }
}

/// Everything computed for one member before the entry is put together.
#[derive(Debug, Clone)]
pub struct MemberComputation<'a> {
    pub member: &'a MemberFinancialSnapshot,
    pub plan_status: PlanStatus,
    pub totals: &'a DetailTotals,
    pub allocation: &'a ContributionAllocation,
    pub basis: &'a EarningsBasis,
    pub earnings: &'a EarningsSplit,
    pub cap: CapOutcome,
}

/// Build the ledger entry for one member.
pub fn assemble_entry(c: &MemberComputation<'_>) -> MemberLedgerEntry {
    let member = c.member;
    let beneficiary = member.is_beneficiary();

    let ledger_forfeiture = c.allocation.incoming_forfeiture - c.totals.forfeits;
    let class_action = if beneficiary {
        c.totals.class_action.max(Decimal::ZERO)
    } else {
        c.totals.class_action
    };
    let contribution_points = if beneficiary { 0 } else { member.points_earned };

    let mut entry = MemberLedgerEntry {
        badge_number: member.badge_number,
        ssn: member.ssn,
        psn: if beneficiary { member.psn } else { None },
        name: member.name.clone(),
        plan_status: c.plan_status,
        beginning_balance: member.current_balance,
        distributions: c.totals.distributions,
        contribution: c.allocation.contribution,
        military: if beneficiary { Decimal::ZERO } else { c.totals.military },
        incoming_forfeiture: c.cap.apply(ledger_forfeiture),
        earnings: c.earnings.earnings,
        earnings_on_etva: c.earnings.earnings_on_etva,
        secondary_earnings: c.earnings.secondary_earnings,
        secondary_earnings_on_etva: c.earnings.secondary_earnings_on_etva,
        class_action,
        transfer: c.totals.allocations,
        paid_transfer: c.totals.paid_allocations,
        contribution_points,
        earning_points: c.basis.earn_points,
        cap_overage: c.cap.overage(),
        cap_overage_points: if c.cap.is_over() { contribution_points } else { 0 },
        ending_balance: Decimal::ZERO,
    };
    entry.ending_balance = entry.compute_ending_balance();
    entry
}

/// Grand totals over the raw ledger entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub beginning_balance: Money,
    pub distributions: Money,
    pub contribution: Money,
    pub military: Money,
    pub incoming_forfeiture: Money,
    pub earnings: Money,
    pub secondary_earnings: Money,
    pub class_action: Money,
    pub ending_balance: Money,
    pub allocations: Money,
    /// Accumulated as a negative amount.
    pub paid_allocations: Money,
    pub contribution_points: Points,
    pub earning_points: Points,
    pub max_over: Money,
    pub max_points: Points,
}

impl LedgerTotals {
    pub fn add(&mut self, entry: &MemberLedgerEntry) {
        self.beginning_balance += entry.beginning_balance;
        self.distributions += entry.distributions;
        self.contribution += entry.contribution;
        self.military += entry.military;
        self.incoming_forfeiture += entry.incoming_forfeiture;
        self.earnings += entry.all_earnings();
        self.secondary_earnings += entry.all_secondary_earnings();
        self.class_action += entry.class_action;
        self.ending_balance += entry.ending_balance;
        self.allocations += entry.transfer;
        self.paid_allocations -= entry.paid_transfer;
        self.contribution_points += entry.contribution_points;
        self.earning_points += entry.earning_points;
        self.max_over += entry.cap_overage;
        self.max_points += entry.cap_overage_points;
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a MemberLedgerEntry>) -> Self {
        let mut totals = Self::default();
        for entry in entries {
            totals.add(entry);
        }
        totals
    }
}
