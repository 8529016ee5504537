pub mod calculator;
pub mod cap;
pub mod detail_totals;
pub mod earnings;
pub mod engine;
pub mod ledger;

pub use engine::{
    run_profit_share_update, run_with_providers, summarize_detail_totals, AdjustmentsApplied,
    DetailTotalsSummary, MemberDetailTotals, ProfitShareUpdateInput, ProfitShareUpdateOutput,
};
