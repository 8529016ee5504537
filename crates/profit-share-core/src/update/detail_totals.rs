use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProfitShareError;
use crate::member::ProfitDetail;
use crate::types::{Money, Ssn};
use crate::ProfitShareResult;

// ---------------------------------------------------------------------------
// Profit codes and iteration tags
// ---------------------------------------------------------------------------

pub const CODE_PARTIAL_WITHDRAWAL: u8 = 1;
pub const CODE_FORFEITURE: u8 = 2;
pub const CODE_DIRECT_PAYMENT: u8 = 3;
pub const CODE_XFER_TO_BENEFICIARY: u8 = 5;
pub const CODE_INCOMING_QDRO_BENEFICIARY: u8 = 6;
pub const CODE_VESTED_PAYMENT: u8 = 9;

pub const ITERATION_MILITARY: u8 = 1;
pub const ITERATION_CLASS_ACTION: u8 = 2;

/// Remark prefixes marking a vested payment as a transfer to another member.
const TRANSFER_MARKERS: [&str; 4] = ["XFER >", "QDRO >", "XFER>", "QDRO>"];

/// Shortest remark the vested-payment check can classify.
const MIN_REMARK_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per member/year aggregates of the profit detail rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailTotals {
    pub distributions: Money,
    pub forfeits: Money,
    /// Incoming QDRO/beneficiary allocations (transfers in).
    pub allocations: Money,
    /// Outgoing transfers to other members.
    pub paid_allocations: Money,
    pub military: Money,
    pub class_action: Money,
}

impl DetailTotals {
    pub fn is_zero(&self) -> bool {
        self.distributions.is_zero()
            && self.forfeits.is_zero()
            && self.allocations.is_zero()
            && self.paid_allocations.is_zero()
            && self.military.is_zero()
            && self.class_action.is_zero()
    }
}

/// Detail totals for every member of a run, keyed by SSN and fetched once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailTotalsBatch {
    totals: HashMap<Ssn, DetailTotals>,
}

impl DetailTotalsBatch {
    pub fn new(totals: HashMap<Ssn, DetailTotals>) -> Self {
        Self { totals }
    }

    /// Totals for a member; members without rows read as all-zero.
    pub fn get(&self, ssn: Ssn) -> DetailTotals {
        self.totals.get(&ssn).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn is_transfer_remark(detail: &ProfitDetail) -> ProfitShareResult<bool> {
    match detail.remark.as_deref() {
        Some(remark) if remark.len() >= MIN_REMARK_LEN => {
            Ok(TRANSFER_MARKERS.iter().any(|m| remark.starts_with(m)))
        }
        _ => Err(ProfitShareError::MalformedRemark {
            ssn: detail.ssn,
            profit_code: detail.profit_code,
            remark: detail.remark.clone(),
        }),
    }
}

/// Add one profit detail row into its buckets. Profit code and iteration tag are
/// classified independently.
pub fn accumulate(totals: &mut DetailTotals, detail: &ProfitDetail) -> ProfitShareResult<()> {
    match detail.profit_code {
        CODE_PARTIAL_WITHDRAWAL | CODE_DIRECT_PAYMENT => {
            totals.distributions += detail.forfeiture;
        }
        CODE_VESTED_PAYMENT => {
            if is_transfer_remark(detail)? {
                totals.paid_allocations += detail.forfeiture;
            } else {
                totals.distributions += detail.forfeiture;
            }
        }
        CODE_FORFEITURE => totals.forfeits += detail.forfeiture,
        CODE_XFER_TO_BENEFICIARY => totals.paid_allocations += detail.forfeiture,
        CODE_INCOMING_QDRO_BENEFICIARY => totals.allocations += detail.contribution,
        _ => {}
    }

    match detail.profit_year_iteration {
        ITERATION_MILITARY => totals.military += detail.contribution,
        ITERATION_CLASS_ACTION => totals.class_action += detail.earnings,
        _ => {}
    }

    Ok(())
}

/// Aggregate one member's rows for a year.
pub fn aggregate_member<'a>(
    details: impl IntoIterator<Item = &'a ProfitDetail>,
) -> ProfitShareResult<DetailTotals> {
    let mut totals = DetailTotals::default();
    for detail in details {
        accumulate(&mut totals, detail)?;
    }
    Ok(totals)
}

/// Aggregate every row of `profit_year` into a keyed batch. Fails on the first
/// unclassifiable row, before any member is processed.
pub fn aggregate_year(details: &[ProfitDetail], profit_year: u16) -> ProfitShareResult<DetailTotalsBatch> {
    let mut totals: HashMap<Ssn, DetailTotals> = HashMap::new();
    for detail in details.iter().filter(|d| d.profit_year == profit_year) {
        accumulate(totals.entry(detail.ssn).or_default(), detail)?;
    }
    tracing::debug!(
        profit_year,
        members = totals.len(),
        rows = details.len(),
        "aggregated profit detail totals"
    );
    Ok(DetailTotalsBatch::new(totals))
}

/// Sum of a bucket across a batch; used by diagnostics.
pub fn batch_sum(batch: &DetailTotalsBatch, bucket: impl Fn(&DetailTotals) -> Money) -> Money {
    batch.totals.values().map(bucket).fold(Decimal::ZERO, |acc, v| acc + v)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(code: u8, iteration: u8) -> ProfitDetail {
        ProfitDetail {
            ssn: 111223333,
            profit_year: 2025,
            profit_code: code,
            profit_year_iteration: iteration,
            contribution: dec!(0),
            earnings: dec!(0),
            forfeiture: dec!(0),
            remark: None,
        }
    }

    fn payment(code: u8, amount: Decimal, remark: Option<&str>) -> ProfitDetail {
        ProfitDetail {
            forfeiture: amount,
            remark: remark.map(str::to_string),
            ..row(code, 0)
        }
    }

    #[test]
    fn test_no_rows_is_all_zero() {
        let totals = aggregate_member(std::iter::empty()).unwrap();
        assert!(totals.is_zero());
    }

    #[test]
    fn test_distribution_codes() {
        let rows = vec![
            payment(CODE_PARTIAL_WITHDRAWAL, dec!(100), None),
            payment(CODE_DIRECT_PAYMENT, dec!(50.25), None),
        ];
        let totals = aggregate_member(&rows).unwrap();
        assert_eq!(totals.distributions, dec!(150.25));
        assert_eq!(totals.paid_allocations, dec!(0));
    }

    #[test]
    fn test_vested_payment_transfer_markers() {
        let rows = vec![
            payment(CODE_VESTED_PAYMENT, dec!(10), Some("XFER > 700174")),
            payment(CODE_VESTED_PAYMENT, dec!(20), Some("QDRO > 700175")),
            payment(CODE_VESTED_PAYMENT, dec!(30), Some("XFER>700176")),
            payment(CODE_VESTED_PAYMENT, dec!(40), Some("QDRO>700177")),
        ];
        let totals = aggregate_member(&rows).unwrap();
        assert_eq!(totals.paid_allocations, dec!(100));
        assert_eq!(totals.distributions, dec!(0));
    }

    #[test]
    fn test_vested_payment_without_marker_is_distribution() {
        let rows = vec![payment(CODE_VESTED_PAYMENT, dec!(75), Some("LUMP SUM PAYOUT"))];
        let totals = aggregate_member(&rows).unwrap();
        assert_eq!(totals.distributions, dec!(75));
        assert_eq!(totals.paid_allocations, dec!(0));
    }

    #[test]
    fn test_short_remark_is_validation_error() {
        let rows = vec![payment(CODE_VESTED_PAYMENT, dec!(75), Some("XFER"))];
        match aggregate_member(&rows).unwrap_err() {
            ProfitShareError::MalformedRemark { profit_code, remark, .. } => {
                assert_eq!(profit_code, CODE_VESTED_PAYMENT);
                assert_eq!(remark.as_deref(), Some("XFER"));
            }
            other => panic!("Expected MalformedRemark, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_remark_is_validation_error() {
        let rows = vec![payment(CODE_VESTED_PAYMENT, dec!(75), None)];
        assert!(matches!(
            aggregate_member(&rows),
            Err(ProfitShareError::MalformedRemark { .. })
        ));
    }

    #[test]
    fn test_short_remark_ignored_outside_vested_payments() {
        let rows = vec![payment(CODE_PARTIAL_WITHDRAWAL, dec!(5), Some("X"))];
        assert_eq!(aggregate_member(&rows).unwrap().distributions, dec!(5));
    }

    #[test]
    fn test_forfeit_and_transfer_codes() {
        let mut incoming = row(CODE_INCOMING_QDRO_BENEFICIARY, 0);
        incoming.contribution = dec!(900);
        let rows = vec![
            payment(CODE_FORFEITURE, dec!(12.5), None),
            payment(CODE_XFER_TO_BENEFICIARY, dec!(300), None),
            incoming,
        ];
        let totals = aggregate_member(&rows).unwrap();
        assert_eq!(totals.forfeits, dec!(12.5));
        assert_eq!(totals.paid_allocations, dec!(300));
        assert_eq!(totals.allocations, dec!(900));
    }

    #[test]
    fn test_iteration_tags() {
        let mut military = row(0, ITERATION_MILITARY);
        military.contribution = dec!(1500);
        let mut class_action = row(0, ITERATION_CLASS_ACTION);
        class_action.earnings = dec!(42.10);
        let totals = aggregate_member(&[military, class_action]).unwrap();
        assert_eq!(totals.military, dec!(1500));
        assert_eq!(totals.class_action, dec!(42.10));
    }

    #[test]
    fn test_year_batch_filters_and_defaults() {
        let mut other_year = payment(CODE_PARTIAL_WITHDRAWAL, dec!(999), None);
        other_year.profit_year = 2024;
        let mut second_member = payment(CODE_FORFEITURE, dec!(7), None);
        second_member.ssn = 222334444;
        let rows = vec![
            payment(CODE_PARTIAL_WITHDRAWAL, dec!(10), None),
            other_year,
            second_member,
        ];
        let batch = aggregate_year(&rows, 2025).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(111223333).distributions, dec!(10));
        assert_eq!(batch.get(222334444).forfeits, dec!(7));
        assert!(batch.get(999999999).is_zero());
        assert_eq!(batch_sum(&batch, |t| t.distributions), dec!(10));
    }
}
