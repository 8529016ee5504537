pub mod detail_totals;
pub mod update;
