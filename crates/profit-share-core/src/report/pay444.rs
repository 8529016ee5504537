use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::report::layout::{
    beneficiary_count_line, employee_count_line, header1, header2, header3, member_line,
    point_line, rerun_line, total_header1, total_header2, total_header3, total_line,
    ReportStamp, TotalColumns, DJDE_CARD, FORM_FEED, REPORT_ID,
};
use crate::types::Money;
use crate::update::ledger::{LedgerTotals, MemberLedgerEntry};

/// Body lines allowed on a page before a new header is forced.
pub const LINE_LIMIT: u32 = 60;
/// Line counter value after a header block.
pub const LINES_AFTER_HEADER: u32 = 4;
/// Blank lines between the counts and the cap-overage line.
const RERUN_GAP: usize = 8;

/// Counters and totals accumulated over one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    pub page_counter: u32,
    pub line_counter: u32,
    /// Employee lines actually printed.
    pub employee_count: usize,
    /// Beneficiary lines actually printed.
    pub beneficiary_count: usize,
    /// Every entry, printed or not.
    pub totals: LedgerTotals,
}

impl Default for RunTotals {
    fn default() -> Self {
        Self {
            page_counter: 0,
            line_counter: LINE_LIMIT + 1,
            employee_count: 0,
            beneficiary_count: 0,
            totals: LedgerTotals::default(),
        }
    }
}

/// Report order: name by byte value, then descending badge or PSN.
pub fn sort_entries(entries: &[MemberLedgerEntry]) -> Vec<&MemberLedgerEntry> {
    let mut sorted: Vec<&MemberLedgerEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        a.name
            .as_bytes()
            .cmp(b.name.as_bytes())
            .then_with(|| Reverse(a.sort_id()).cmp(&Reverse(b.sort_id())))
    });
    sorted
}

struct Pay444Writer {
    stamp: ReportStamp,
    lines: Vec<String>,
    run: RunTotals,
}

impl Pay444Writer {
    fn new(stamp: ReportStamp) -> Self {
        Self {
            stamp,
            lines: Vec::new(),
            run: RunTotals::default(),
        }
    }

    fn write(&mut self, line: impl AsRef<str>) {
        self.lines.push(line.as_ref().trim_end().to_string());
    }

    fn print_header(&mut self) {
        self.run.page_counter += 1;
        let page = self.run.page_counter;
        self.write(header1(REPORT_ID, &self.stamp, page));
        self.write("");
        self.write(header2());
        self.write(header3());
        self.run.line_counter = LINES_AFTER_HEADER;
    }

    fn write_entry(&mut self, entry: &MemberLedgerEntry) {
        if self.run.line_counter > LINE_LIMIT {
            self.print_header();
        }

        self.run.totals.add(entry);
        if entry.is_blank() {
            return;
        }

        self.write(member_line(entry));
        if entry.is_beneficiary() {
            self.run.beneficiary_count += 1;
        } else {
            self.run.employee_count += 1;
        }
        self.run.line_counter += 1;
    }

    fn print_totals(&mut self, max_allowed: Money) {
        let totals = self.run.totals.clone();

        self.write(total_header1(&self.stamp));
        self.write("");
        self.write(total_header2());
        self.write(total_header3());
        self.write("");
        self.write(total_line(
            "TOTALS",
            &TotalColumns {
                beginning_balance: Some(totals.beginning_balance),
                distributions: Some(totals.distributions),
                contribution: Some(totals.contribution),
                military: Some(totals.military),
                incoming_forfeiture: Some(totals.incoming_forfeiture),
                earnings: Some(totals.earnings),
                class_action: Some(totals.class_action),
                ending_balance: Some(totals.ending_balance),
            },
        ));
        self.write(total_line(
            "ALLOC",
            &TotalColumns {
                contribution: Some(totals.allocations),
                military: Some(totals.paid_allocations),
                ending_balance: Some(totals.allocations + totals.paid_allocations),
                ..Default::default()
            },
        ));
        self.write("");
        self.write(point_line(totals.contribution_points, totals.earning_points));
        self.write("");
        self.write(employee_count_line(self.run.employee_count));
        self.write("");
        self.write(beneficiary_count_line(self.run.beneficiary_count));
        for _ in 0..RERUN_GAP {
            self.write("");
        }
        self.write(rerun_line(totals.max_over, totals.max_points, max_allowed));
    }
}

/// Render the PAY444 ledger: control card, paginated body, totals page.
pub fn render_pay444(
    stamp: ReportStamp,
    entries: &[MemberLedgerEntry],
    max_allowed: Money,
) -> (Vec<String>, RunTotals) {
    let mut writer = Pay444Writer::new(stamp);
    writer.write(format!("{FORM_FEED}{DJDE_CARD}"));

    for entry in sort_entries(entries) {
        writer.write_entry(entry);
    }
    writer.print_totals(max_allowed);

    tracing::debug!(
        pages = writer.run.page_counter,
        employees = writer.run.employee_count,
        beneficiaries = writer.run.beneficiary_count,
        lines = writer.lines.len(),
        "rendered PAY444"
    );
    (writer.lines, writer.run)
}
