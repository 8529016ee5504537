use std::collections::HashSet;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::member::{MemberFinancialSnapshot, ProfitDetail};
use crate::params::AdjustmentParameters;
use crate::provider::{DetailTotalsProvider, InMemoryRoster, MemberRosterProvider, TransactionLedger};
use crate::types::{with_metadata, BadgeNumber, ComputationOutput, Ssn};
use crate::update::calculator::{compute_contribution_allocation, ContributionAllocation, OverrideApplied};
use crate::update::cap::{enforce_contribution_cap, CapOutcome, RerunFlag};
use crate::update::detail_totals::{batch_sum, DetailTotals, DetailTotalsBatch};
use crate::update::earnings::{
    compute_beneficiary_earnings, compute_employee_earnings, earnings_basis, EtvaUpdate,
};
use crate::update::ledger::{assemble_entry, LedgerTotals, MemberComputation, MemberLedgerEntry};
use crate::ProfitShareResult;

pub const RERUN_WARNING: &str = "Rerun of PAY444 is required";

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// A complete run: parameters plus the roster and profit detail rows it reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitShareUpdateInput {
    pub profit_year: u16,
    pub parameters: AdjustmentParameters,
    #[serde(default)]
    pub members: Vec<MemberFinancialSnapshot>,
    #[serde(default)]
    pub transactions: Vec<ProfitDetail>,
    /// Timestamp printed in report headers; local now when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<NaiveDateTime>,
}

/// Override amounts before and after their deltas, for the adjustment report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentsApplied {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_badge: Option<BadgeNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_badge: Option<BadgeNumber>,
    pub primary_matched: bool,
    pub secondary_matched: bool,
    pub contribution: OverrideApplied,
    pub incoming_forfeiture: OverrideApplied,
    pub earnings: OverrideApplied,
    pub secondary_earnings: OverrideApplied,
}

impl AdjustmentsApplied {
    fn for_parameters(params: &AdjustmentParameters) -> Self {
        Self {
            primary_badge: params.primary_override.as_ref().map(|o| o.badge_number),
            secondary_badge: params.secondary_override.as_ref().map(|o| o.badge_number),
            ..Default::default()
        }
    }

    fn record_primary(&mut self, allocation: &ContributionAllocation, earnings: Option<OverrideApplied>) {
        let (Some(contribution), Some(forfeiture)) =
            (allocation.contribution_override, allocation.forfeiture_override)
        else {
            return;
        };
        self.primary_matched = true;
        self.contribution = contribution;
        self.incoming_forfeiture = forfeiture;
        self.earnings = earnings.unwrap_or_default();
    }

    fn record_secondary(&mut self, secondary: Option<OverrideApplied>) {
        if let Some(applied) = secondary {
            self.secondary_matched = true;
            self.secondary_earnings = applied;
        }
    }

    pub fn any_supplied(&self) -> bool {
        self.primary_badge.is_some() || self.secondary_badge.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitShareUpdateOutput {
    pub profit_year: u16,
    pub generated_at: NaiveDateTime,
    /// Employees in roster order, then beneficiaries.
    pub entries: Vec<MemberLedgerEntry>,
    pub adjustments: AdjustmentsApplied,
    pub rerun_needed: bool,
    pub rerun: RerunFlag,
    pub etva_updates: Vec<EtvaUpdate>,
    pub totals: LedgerTotals,
    pub members_skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub report_lines: Vec<String>,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the update over an in-memory roster and profit detail rows.
pub fn run_profit_share_update(
    input: &ProfitShareUpdateInput,
) -> ProfitShareResult<ComputationOutput<ProfitShareUpdateOutput>> {
    let roster = InMemoryRoster::new(input.members.clone());
    let ledger = TransactionLedger::new(input.transactions.clone());
    let generated_at = input
        .generated_at
        .unwrap_or_else(|| Local::now().naive_local());
    run_with_providers(
        input.profit_year,
        &input.parameters,
        &roster,
        &ledger,
        generated_at,
    )
}

/// Run the update against external roster and detail totals sources.
pub fn run_with_providers(
    profit_year: u16,
    params: &AdjustmentParameters,
    roster: &dyn MemberRosterProvider,
    details: &dyn DetailTotalsProvider,
    generated_at: NaiveDateTime,
) -> ProfitShareResult<ComputationOutput<ProfitShareUpdateOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;

    let members = roster.members(profit_year)?;
    let ssns: Vec<Ssn> = members.iter().map(|m| m.ssn).collect();
    let batch = details.detail_totals(profit_year, &ssns)?;
    tracing::debug!(profit_year, members = members.len(), "loaded roster and detail totals");

    let (employees, beneficiaries): (Vec<&MemberFinancialSnapshot>, Vec<&MemberFinancialSnapshot>) =
        members.iter().partition(|m| !m.is_beneficiary());
    let employee_ssns: HashSet<Ssn> = employees.iter().map(|m| m.ssn).collect();

    let mut run = RunState::new(params);

    for member in &employees {
        run.process_employee(member, &batch, &mut warnings);
    }
    for member in &beneficiaries {
        if employee_ssns.contains(&member.ssn) {
            tracing::debug!(ssn = member.ssn, "beneficiary already handled as employee");
            run.skipped += 1;
            continue;
        }
        run.process_beneficiary(member, &batch);
    }

    for (badge, matched, label) in [
        (run.adjustments.primary_badge, run.adjustments.primary_matched, "primary"),
        (run.adjustments.secondary_badge, run.adjustments.secondary_matched, "secondary"),
    ] {
        if let (Some(badge), false) = (badge, matched) {
            tracing::warn!(badge, kind = label, "override badge matched no member");
            warnings.push(format!("No adjustment - employee not found (badge {badge})"));
        }
    }

    if run.rerun.is_raised() {
        tracing::warn!(
            members = run.rerun.members_over.len(),
            over = %run.rerun.over_total,
            "{}",
            RERUN_WARNING
        );
        warnings.push(RERUN_WARNING.to_string());
    }

    let totals = LedgerTotals::from_entries(&run.entries);
    tracing::info!(
        profit_year,
        entries = run.entries.len(),
        skipped = run.skipped,
        rerun_needed = run.rerun.is_raised(),
        "profit share update complete"
    );

    #[cfg(feature = "report")]
    let report_lines = crate::report::render_report(&crate::report::ReportContext {
        profit_year,
        generated_at,
        parameters: params,
        entries: &run.entries,
        adjustments: &run.adjustments,
    });
    #[cfg(not(feature = "report"))]
    let report_lines = Vec::new();

    let output = ProfitShareUpdateOutput {
        profit_year,
        generated_at,
        entries: run.entries,
        adjustments: run.adjustments,
        rerun_needed: run.rerun.is_raised(),
        rerun: run.rerun,
        etva_updates: run.etva_updates,
        totals,
        members_skipped: run.skipped,
        report_lines,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Profit share update (PAY444): points-based allocation with ETVA proration and contribution cap",
        &serde_json::json!({
            "profit_year": profit_year,
            "contribution_percent": params.contribution_percent.to_string(),
            "incoming_forfeit_percent": params.incoming_forfeit_percent.to_string(),
            "earnings_percent": params.earnings_percent.to_string(),
            "secondary_earnings_percent": params.secondary_earnings_percent.to_string(),
            "max_allowed_contributions": params.max_allowed_contributions.to_string(),
            "rounding": "half away from zero, 2dp",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Detail totals diagnostic
// ---------------------------------------------------------------------------

/// One roster member's aggregated buckets for the year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDetailTotals {
    pub badge_number: BadgeNumber,
    pub ssn: Ssn,
    pub name: String,
    #[serde(flatten)]
    pub totals: DetailTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailTotalsSummary {
    pub profit_year: u16,
    /// Roster order; members without activity are left out.
    pub members: Vec<MemberDetailTotals>,
    pub combined: DetailTotals,
}

/// Aggregate the run's profit detail rows per roster member without running
/// the allocation.
pub fn summarize_detail_totals(
    input: &ProfitShareUpdateInput,
) -> ProfitShareResult<ComputationOutput<DetailTotalsSummary>> {
    let start = Instant::now();
    let ledger = TransactionLedger::new(input.transactions.clone());
    let ssns: Vec<Ssn> = input.members.iter().map(|m| m.ssn).collect();
    let batch = ledger.detail_totals(input.profit_year, &ssns)?;

    let mut seen: HashSet<Ssn> = HashSet::new();
    let members: Vec<MemberDetailTotals> = input
        .members
        .iter()
        .filter(|m| seen.insert(m.ssn))
        .map(|m| MemberDetailTotals {
            badge_number: m.badge_number,
            ssn: m.ssn,
            name: m.name.clone(),
            totals: batch.get(m.ssn),
        })
        .filter(|row| !row.totals.is_zero())
        .collect();

    let combined = DetailTotals {
        distributions: batch_sum(&batch, |t| t.distributions),
        forfeits: batch_sum(&batch, |t| t.forfeits),
        allocations: batch_sum(&batch, |t| t.allocations),
        paid_allocations: batch_sum(&batch, |t| t.paid_allocations),
        military: batch_sum(&batch, |t| t.military),
        class_action: batch_sum(&batch, |t| t.class_action),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Profit detail aggregation by profit code and remark",
        &serde_json::json!({
            "profit_year": input.profit_year,
            "rows": input.transactions.len(),
        }),
        Vec::new(),
        elapsed,
        DetailTotalsSummary {
            profit_year: input.profit_year,
            members,
            combined,
        },
    ))
}

/// Single-writer state for one run.
struct RunState<'p> {
    params: &'p AdjustmentParameters,
    entries: Vec<MemberLedgerEntry>,
    adjustments: AdjustmentsApplied,
    rerun: RerunFlag,
    etva_updates: Vec<EtvaUpdate>,
    skipped: usize,
}

impl<'p> RunState<'p> {
    fn new(params: &'p AdjustmentParameters) -> Self {
        Self {
            params,
            entries: Vec::new(),
            adjustments: AdjustmentsApplied::for_parameters(params),
            rerun: RerunFlag::default(),
            etva_updates: Vec::new(),
            skipped: 0,
        }
    }

    fn process_employee(
        &mut self,
        member: &MemberFinancialSnapshot,
        batch: &DetailTotalsBatch,
        warnings: &mut Vec<String>,
    ) {
        if !member.qualifies() {
            self.skipped += 1;
            return;
        }

        let totals = batch.get(member.ssn);
        let allocation =
            compute_contribution_allocation(self.params, member.badge_number, member.points_earned);
        let basis = earnings_basis(member.current_balance, &totals);
        let earnings = compute_employee_earnings(self.params, member, &basis, totals.class_action);

        let cap = enforce_contribution_cap(
            allocation.contribution,
            totals.military,
            allocation.incoming_forfeiture,
            self.params.max_allowed_contributions,
        );
        if let CapOutcome::ForfeitureExhausted { overage } = cap {
            let message = format!(
                "FORFEITURES NOT ENOUGH FOR AMOUNT OVER MAX FOR EMPLOYEE BADGE #{}",
                member.badge_number
            );
            tracing::warn!(badge = member.badge_number, %overage, "{}", message);
            warnings.push(message);
        } else if cap.is_over() {
            tracing::warn!(
                badge = member.badge_number,
                overage = %cap.overage(),
                "contribution cap exceeded; forfeiture reduced"
            );
        }
        self.rerun.record(member.badge_number, cap, member.points_earned);

        self.adjustments
            .record_primary(&allocation, earnings.earnings_override);
        self.adjustments.record_secondary(earnings.secondary_override);
        if let Some(update) = &earnings.etva_update {
            self.etva_updates.push(update.clone());
        }

        self.entries.push(assemble_entry(&MemberComputation {
            member,
            plan_status: member.effective_status(),
            totals: &totals,
            allocation: &allocation,
            basis: &basis,
            earnings: &earnings,
            cap,
        }));
    }

    fn process_beneficiary(&mut self, member: &MemberFinancialSnapshot, batch: &DetailTotalsBatch) {
        let totals = batch.get(member.ssn);
        let basis = earnings_basis(member.current_balance, &totals);
        let earnings = compute_beneficiary_earnings(self.params, member, &basis);

        self.entries.push(assemble_entry(&MemberComputation {
            member,
            plan_status: member.effective_status(),
            totals: &totals,
            allocation: &ContributionAllocation::default(),
            basis: &basis,
            earnings: &earnings,
            cap: CapOutcome::WithinCap,
        }));
    }
}
