//! Plot-ready series derived from a schedule. Rendering is left to the caller;
//! these only reshape the rows for the three standard views.

use crate::error::LoanResult;
use crate::loan::{round, DEC_PLACES};
use crate::schedule::ScheduleEntry;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChartView {
    /// Remaining balance against period
    Balance,
    /// Interest and principal portions of each payment
    Split,
    /// Running total of interest paid
    Cumulative,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BalancePoint {
    pub period: u32,
    pub balance: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitPoint {
    pub period: u32,
    pub interest: f64,
    pub principal: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CumulativePoint {
    pub period: u32,
    pub cumulative_interest: f64,
}

pub fn balance_over_time(schedule: &[ScheduleEntry]) -> Vec<BalancePoint> {
    schedule
        .iter()
        .map(|e| BalancePoint {
            period: e.period,
            balance: e.ending_balance,
        })
        .collect()
}

pub fn interest_vs_principal(schedule: &[ScheduleEntry]) -> Vec<SplitPoint> {
    schedule
        .iter()
        .map(|e| SplitPoint {
            period: e.period,
            interest: e.interest,
            principal: e.principal_paid,
        })
        .collect()
}

pub fn cumulative_interest(schedule: &[ScheduleEntry]) -> Vec<CumulativePoint> {
    let mut total = 0.;
    schedule
        .iter()
        .map(|e| {
            total += e.interest;
            CumulativePoint {
                period: e.period,
                cumulative_interest: round(total, DEC_PLACES),
            }
        })
        .collect()
}

/// Write one view as CSV, headed by its column names.
pub fn write_series<W: io::Write>(
    schedule: &[ScheduleEntry],
    view: ChartView,
    writer: W,
) -> LoanResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    match view {
        ChartView::Balance => {
            wtr.write_record(["Month", "Balance"])?;
            for p in balance_over_time(schedule) {
                wtr.write_record([p.period.to_string(), format!("{:.2}", p.balance)])?;
            }
        }
        ChartView::Split => {
            wtr.write_record(["Month", "Interest", "Principal"])?;
            for p in interest_vs_principal(schedule) {
                wtr.write_record([
                    p.period.to_string(),
                    format!("{:.2}", p.interest),
                    format!("{:.2}", p.principal),
                ])?;
            }
        }
        ChartView::Cumulative => {
            wtr.write_record(["Month", "CumulativeInterest"])?;
            for p in cumulative_interest(schedule) {
                wtr.write_record([
                    p.period.to_string(),
                    format!("{:.2}", p.cumulative_interest),
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}
