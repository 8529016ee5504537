//! Fixed-column record layouts for the PAY444 ledger and PAY444A adjustment
//! reports. Every function returns one print line; callers trim trailing blanks.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::report::picture::{blank_amount, edit_amount, edit_count, edit_points, field_width};
use crate::types::{BadgeNumber, Money, Points};
use crate::update::ledger::MemberLedgerEntry;

pub const FORM_FEED: char = '\u{c}';

/// Print-control card that opens the PAY444 spool file.
pub const DJDE_CARD: &str = "DJDE JDE=PAY426,JDL=PAYROL,END,;";

pub const REPORT_ID: &str = "PAY444";
pub const ADJUSTMENT_REPORT_ID: &str = "PAY444A";

pub const NAME_WIDTH: usize = 24;

/// Integer digits of the per-member amount columns.
pub const MEMBER_DIGITS: usize = 7;
/// Integer digits of the totals and adjustment columns.
pub const TOTAL_DIGITS: usize = 9;

const ID_WIDTH: usize = 11;
const FLAG_WIDTH: usize = 3;
const TOTAL_LABEL_WIDTH: usize = 12;
const ADJUST_BADGE_WIDTH: usize = 9;
const ADJUST_DESC_WIDTH: usize = 12;

fn member_slot() -> usize {
    field_width(MEMBER_DIGITS, true) + 1
}

fn total_slot() -> usize {
    field_width(TOTAL_DIGITS, true) + 1
}

fn slots<S: AsRef<str>>(cells: &[S], width: usize) -> String {
    cells
        .iter()
        .map(|c| format!("{:>width$}", c.as_ref(), width = width))
        .collect()
}

/// Timestamp and year printed on every header.
#[derive(Debug, Clone, Copy)]
pub struct ReportStamp {
    pub profit_year: u16,
    pub generated_at: NaiveDateTime,
}

impl ReportStamp {
    fn date_time(&self) -> String {
        let at = self.generated_at;
        format!(
            "DATE {:02}/{:02}/{:02}  TIME {:02}:{:02}",
            at.month(),
            at.day(),
            at.year() % 100,
            at.hour(),
            at.minute()
        )
    }
}

// ---------------------------------------------------------------------------
// Ledger body
// ---------------------------------------------------------------------------

pub fn header1(report_id: &str, stamp: &ReportStamp, page: u32) -> String {
    format!(
        "{FORM_FEED}{:<8}  {}          PROFIT SHARING UPDATE - PROFIT YEAR {}          PAGE {:>4}",
        report_id,
        stamp.date_time(),
        stamp.profit_year,
        page
    )
}

pub fn header2() -> String {
    let lead = " ".repeat(ID_WIDTH + NAME_WIDTH + FLAG_WIDTH + 2);
    let titles = ["BEGINNING", "", "", "", "INCOMING", "", "CLASS", "ENDING"];
    format!("{lead}{}", slots(&titles, member_slot()))
}

pub fn header3() -> String {
    let lead = format!(
        "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<FLAG_WIDTH$}",
        "BADGE/PSN", "EMPLOYEE NAME", "STS"
    );
    let titles = [
        "BALANCE", "DISTRIB", "CONTRIB", "MILITARY", "FORFEIT", "EARNINGS", "ACTION", "BALANCE",
    ];
    format!("{lead}{}", slots(&titles, member_slot()))
}

/// Truncate to the report's name width, by character.
pub fn report_name(name: &str) -> String {
    name.chars().take(NAME_WIDTH).collect()
}

fn member_id(entry: &MemberLedgerEntry) -> String {
    if entry.is_beneficiary() {
        format!("{:011}", entry.psn.unwrap_or(0))
    } else {
        format!("    {:07}", entry.badge_number)
    }
}

fn member_flag(entry: &MemberLedgerEntry) -> &'static str {
    if entry.is_beneficiary() {
        "BEN"
    } else {
        entry.plan_status.report_flag()
    }
}

/// Employee line (7-digit badge) or beneficiary line (11-digit PSN).
pub fn member_line(entry: &MemberLedgerEntry) -> String {
    let view = entry.display();
    let amounts = [
        entry.beginning_balance,
        entry.distributions,
        view.contribution,
        view.military,
        view.incoming_forfeiture,
        view.earnings,
        view.class_action,
        entry.ending_balance,
    ]
    .map(|v| edit_amount(v, MEMBER_DIGITS));

    format!(
        "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<FLAG_WIDTH$}{}",
        member_id(entry),
        report_name(&entry.name),
        member_flag(entry),
        slots(&amounts, member_slot())
    )
}

// ---------------------------------------------------------------------------
// Totals page
// ---------------------------------------------------------------------------

pub fn total_header1(stamp: &ReportStamp) -> String {
    format!(
        "{FORM_FEED}{:<8}  {}          PROFIT SHARING UPDATE TOTALS - PROFIT YEAR {}",
        REPORT_ID,
        stamp.date_time(),
        stamp.profit_year
    )
}

pub fn total_header2() -> String {
    let titles = ["BEGINNING", "", "", "", "INCOMING", "", "CLASS", "ENDING"];
    format!("{}{}", " ".repeat(TOTAL_LABEL_WIDTH), slots(&titles, total_slot()))
}

pub fn total_header3() -> String {
    let titles = [
        "BALANCE", "DISTRIB", "CONTRIB", "MILITARY", "FORFEIT", "EARNINGS", "ACTION", "BALANCE",
    ];
    format!("{}{}", " ".repeat(TOTAL_LABEL_WIDTH), slots(&titles, total_slot()))
}

/// Column values of a totals line; `None` leaves the column blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalColumns {
    pub beginning_balance: Option<Money>,
    pub distributions: Option<Money>,
    pub contribution: Option<Money>,
    pub military: Option<Money>,
    pub incoming_forfeiture: Option<Money>,
    pub earnings: Option<Money>,
    pub class_action: Option<Money>,
    pub ending_balance: Option<Money>,
}

pub fn total_line(label: &str, columns: &TotalColumns) -> String {
    let cells = [
        columns.beginning_balance,
        columns.distributions,
        columns.contribution,
        columns.military,
        columns.incoming_forfeiture,
        columns.earnings,
        columns.class_action,
        columns.ending_balance,
    ]
    .map(|v| match v {
        Some(v) => edit_amount(v, TOTAL_DIGITS),
        None => blank_amount(TOTAL_DIGITS),
    });
    format!("{:<TOTAL_LABEL_WIDTH$}{}", label, slots(&cells, total_slot()))
}

/// Points line: contribution points under CONTRIB, earning points under EARNINGS.
pub fn point_line(contribution_points: Points, earning_points: Points) -> String {
    let blank = String::new();
    let cont = edit_points(contribution_points, TOTAL_DIGITS);
    let earn = edit_points(earning_points, TOTAL_DIGITS);
    let cells = [&blank, &blank, &cont, &blank, &blank, &earn, &blank, &blank];
    format!("{:<TOTAL_LABEL_WIDTH$}{}", "POINT", slots(&cells, total_slot()))
}

pub fn employee_count_line(count: usize) -> String {
    format!("{:<28}{}", "TOTAL EMPLOYEES", edit_count(count, 7))
}

pub fn beneficiary_count_line(count: usize) -> String {
    format!("{:<28}{}", "TOTAL BENEFICIARIES", edit_count(count, 7))
}

pub fn rerun_line(over: Money, points: Points, max_allowed: Money) -> String {
    format!(
        "AMOUNT OVER MAXIMUM {}   POINTS {}   MAXIMUM CONTRIBUTION {}",
        edit_amount(over, TOTAL_DIGITS),
        edit_points(points, TOTAL_DIGITS),
        edit_amount(max_allowed, TOTAL_DIGITS)
    )
}

// ---------------------------------------------------------------------------
// Adjustment report
// ---------------------------------------------------------------------------

pub fn adjustment_header4() -> String {
    "PROFIT SHARING OVERRIDE ADJUSTMENTS".to_string()
}

pub fn adjustment_header5() -> String {
    let titles = ["CONTRIBUTION", "FORFEITURE", "EARNINGS", "SECONDARY"];
    format!(
        "{:<ADJUST_BADGE_WIDTH$}{:<ADJUST_DESC_WIDTH$}{}",
        "BADGE",
        "",
        slots(&titles, total_slot())
    )
}

/// Contribution, forfeiture, earnings, secondary earnings.
pub type AdjustmentAmounts = [Money; 4];

pub fn adjustment_line(badge: Option<BadgeNumber>, description: &str, amounts: &AdjustmentAmounts) -> String {
    let badge = badge.map(|b| format!("{b:07}")).unwrap_or_default();
    let cells = amounts.map(|v| edit_amount(v, TOTAL_DIGITS));
    format!(
        "{:<ADJUST_BADGE_WIDTH$}{:<ADJUST_DESC_WIDTH$}{}",
        badge,
        description,
        slots(&cells, total_slot())
    )
}
