use rust_decimal::Decimal;

use crate::params::AdjustmentParameters;
use crate::report::layout::{
    adjustment_header4, adjustment_header5, adjustment_line, header1, AdjustmentAmounts,
    ReportStamp, ADJUSTMENT_REPORT_ID,
};
use crate::update::engine::AdjustmentsApplied;

pub const NOT_FOUND_LINE: &str = "No adjustment - employee not found.";

/// The PAY444A override report. Empty when no override target was supplied.
pub fn render_adjustment_report(
    stamp: ReportStamp,
    params: &AdjustmentParameters,
    applied: &AdjustmentsApplied,
) -> Vec<String> {
    if !applied.any_supplied() {
        return Vec::new();
    }

    let initial: AdjustmentAmounts = [
        applied.contribution.unadjusted,
        applied.incoming_forfeiture.unadjusted,
        applied.earnings.unadjusted,
        applied.secondary_earnings.unadjusted,
    ];
    let primary = params.primary_override.as_ref();
    let deltas: AdjustmentAmounts = [
        primary.map_or(Decimal::ZERO, |o| o.contribution_delta),
        primary.map_or(Decimal::ZERO, |o| o.forfeiture_delta),
        primary.map_or(Decimal::ZERO, |o| o.earnings_delta),
        params
            .secondary_override
            .as_ref()
            .map_or(Decimal::ZERO, |o| o.secondary_earnings_delta),
    ];
    let adjusted: AdjustmentAmounts = [
        applied.contribution.adjusted,
        applied.incoming_forfeiture.adjusted,
        applied.earnings.adjusted,
        applied.secondary_earnings.adjusted,
    ];
    let badge = applied.primary_badge.or(applied.secondary_badge);

    let mut lines = vec![
        header1(ADJUSTMENT_REPORT_ID, &stamp, 1),
        String::new(),
        adjustment_header4(),
        String::new(),
        adjustment_header5(),
        String::new(),
        adjustment_line(badge, "INITIAL", &initial),
        String::new(),
        adjustment_line(None, "ADJUSTMENT", &deltas),
        String::new(),
        adjustment_line(None, "FINAL", &adjusted),
    ];

    let unmatched = [
        applied.primary_badge.is_some() && !applied.primary_matched,
        applied.secondary_badge.is_some() && !applied.secondary_matched,
    ];
    for _ in unmatched.iter().filter(|missing| **missing) {
        lines.push(String::new());
        lines.push(NOT_FOUND_LINE.to_string());
    }

    lines.iter().map(|l| l.trim_end().to_string()).collect()
}
