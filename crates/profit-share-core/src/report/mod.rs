pub mod adjustment;
pub mod layout;
pub mod pay444;
pub mod picture;

use chrono::NaiveDateTime;

use crate::params::AdjustmentParameters;
use crate::update::engine::AdjustmentsApplied;
use crate::update::ledger::MemberLedgerEntry;

use self::layout::ReportStamp;

/// Inputs to one report render.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub profit_year: u16,
    pub generated_at: NaiveDateTime,
    pub parameters: &'a AdjustmentParameters,
    pub entries: &'a [MemberLedgerEntry],
    pub adjustments: &'a AdjustmentsApplied,
}

/// PAY444 followed by PAY444A when an override target was supplied.
pub fn render_report(ctx: &ReportContext<'_>) -> Vec<String> {
    let stamp = ReportStamp {
        profit_year: ctx.profit_year,
        generated_at: ctx.generated_at,
    };
    let (mut lines, _) = pay444::render_pay444(
        stamp,
        ctx.entries,
        ctx.parameters.max_allowed_contributions,
    );
    lines.extend(adjustment::render_adjustment_report(
        stamp,
        ctx.parameters,
        ctx.adjustments,
    ));
    lines
}
