use chrono::NaiveDateTime;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use profit_share_core::params::AdjustmentParameters;
use profit_share_core::update::{run_profit_share_update, ProfitShareUpdateInput};

use crate::input;

/// Arguments for the profit share update
#[derive(Args)]
pub struct UpdateArgs {
    /// Path to JSON or YAML run document
    #[arg(long)]
    pub input: Option<String>,

    /// Timestamp printed in report headers (YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_parser = parse_timestamp)]
    pub generated_at: Option<NaiveDateTime>,

    /// Override the document's contribution percent
    #[arg(long)]
    pub contribution_percent: Option<Decimal>,

    /// Override the document's incoming forfeiture percent
    #[arg(long)]
    pub incoming_forfeit_percent: Option<Decimal>,

    /// Override the document's earnings percent
    #[arg(long)]
    pub earnings_percent: Option<Decimal>,

    /// Override the document's secondary earnings percent
    #[arg(long)]
    pub secondary_earnings_percent: Option<Decimal>,

    /// Override the document's annual contribution cap
    #[arg(long)]
    pub max_allowed_contributions: Option<Decimal>,
}

impl UpdateArgs {
    fn apply_to(&self, params: &mut AdjustmentParameters) {
        let overrides = [
            (&mut params.contribution_percent, self.contribution_percent),
            (&mut params.incoming_forfeit_percent, self.incoming_forfeit_percent),
            (&mut params.earnings_percent, self.earnings_percent),
            (&mut params.secondary_earnings_percent, self.secondary_earnings_percent),
            (&mut params.max_allowed_contributions, self.max_allowed_contributions),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("invalid timestamp '{s}', expected YYYY-MM-DDTHH:MM:SS"))
}

pub fn run_update(args: UpdateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut run: ProfitShareUpdateInput =
        input::read_document(args.input.as_deref(), "the profit share update")?;
    args.apply_to(&mut run.parameters);
    if args.generated_at.is_some() {
        run.generated_at = args.generated_at;
    }
    tracing::info!(
        profit_year = run.profit_year,
        members = run.members.len(),
        transactions = run.transactions.len(),
        "running profit share update"
    );
    let result = run_profit_share_update(&run)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> AdjustmentParameters {
        AdjustmentParameters {
            contribution_percent: dec!(15),
            incoming_forfeit_percent: dec!(1),
            earnings_percent: dec!(5),
            secondary_earnings_percent: dec!(0),
            max_allowed_contributions: dec!(57000),
            primary_override: None,
            secondary_override: None,
        }
    }

    #[test]
    fn test_flags_override_document_parameters() {
        let args = UpdateArgs {
            input: None,
            generated_at: None,
            contribution_percent: None,
            incoming_forfeit_percent: None,
            earnings_percent: Some(dec!(7.5)),
            secondary_earnings_percent: None,
            max_allowed_contributions: Some(dec!(69000)),
        };
        let mut p = params();
        args.apply_to(&mut p);
        assert_eq!(p.contribution_percent, dec!(15));
        assert_eq!(p.earnings_percent, dec!(7.5));
        assert_eq!(p.max_allowed_contributions, dec!(69000));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2026-01-05 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_timestamp("2026-01-05T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2026-01-05 09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2026-01-05T09:30").unwrap(), expected);
        assert!(parse_timestamp("01/05/26").is_err());
    }
}
