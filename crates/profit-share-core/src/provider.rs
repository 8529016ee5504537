use std::collections::HashSet;

use crate::member::{MemberFinancialSnapshot, ProfitDetail};
use crate::types::Ssn;
use crate::update::detail_totals::{aggregate_year, DetailTotalsBatch};
use crate::ProfitShareResult;

/// Source of the employee and beneficiary snapshots for a profit year.
pub trait MemberRosterProvider {
    fn members(&self, profit_year: u16) -> ProfitShareResult<Vec<MemberFinancialSnapshot>>;
}

/// Source of per-member detail totals, fetched once for a whole run.
pub trait DetailTotalsProvider {
    /// Totals for the given members. Members without activity may be left out
    /// of the batch; they read back as all-zero.
    fn detail_totals(&self, profit_year: u16, ssns: &[Ssn]) -> ProfitShareResult<DetailTotalsBatch>;
}

/// Roster held in memory, in the order it was supplied.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    members: Vec<MemberFinancialSnapshot>,
}

impl InMemoryRoster {
    pub fn new(members: Vec<MemberFinancialSnapshot>) -> Self {
        Self { members }
    }
}

impl MemberRosterProvider for InMemoryRoster {
    fn members(&self, _profit_year: u16) -> ProfitShareResult<Vec<MemberFinancialSnapshot>> {
        Ok(self.members.clone())
    }
}

/// Profit detail rows held in memory and aggregated on request.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    details: Vec<ProfitDetail>,
}

impl TransactionLedger {
    pub fn new(details: Vec<ProfitDetail>) -> Self {
        Self { details }
    }

    pub fn details(&self) -> &[ProfitDetail] {
        &self.details
    }
}

impl DetailTotalsProvider for TransactionLedger {
    fn detail_totals(&self, profit_year: u16, ssns: &[Ssn]) -> ProfitShareResult<DetailTotalsBatch> {
        let wanted: HashSet<Ssn> = ssns.iter().copied().collect();
        let rows: Vec<ProfitDetail> = self
            .details
            .iter()
            .filter(|d| wanted.contains(&d.ssn))
            .cloned()
            .collect();
        aggregate_year(&rows, profit_year)
    }
}
