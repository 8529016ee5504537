use clap::Args;
use serde_json::Value;

use profit_share_core::update::{summarize_detail_totals, ProfitShareUpdateInput};

use crate::input;

/// Arguments for the detail totals diagnostic
#[derive(Args)]
pub struct DetailTotalsArgs {
    /// Path to JSON or YAML run document
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_detail_totals(args: DetailTotalsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let run: ProfitShareUpdateInput =
        input::read_document(args.input.as_deref(), "detail totals")?;
    let result = summarize_detail_totals(&run)?;
    Ok(serde_json::to_value(result)?)
}
