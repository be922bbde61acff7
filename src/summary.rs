use crate::error::LoanResult;
use crate::loan::{validate, LoanTerms};
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default checkpoint for the balance line: five years of payments.
pub const DEFAULT_CHECKPOINT: u32 = 60;

/// Headline figures for a loan. Values carry full precision; rounding is left to
/// whoever presents them.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoanSummary {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_years: f64,
    pub months: u32,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_cost: f64,
    pub payments_made: u32,
    pub balance_after: f64,
}

pub fn summarize(terms: &LoanTerms, payments_made: u32) -> LoanSummary {
    let plan = terms.payment_plan();
    let total_interest = plan.total_interest(terms);
    LoanSummary {
        principal: terms.principal(),
        annual_rate: terms.annual_rate(),
        term_years: terms.term_years(),
        months: terms.months(),
        monthly_payment: plan.monthly_payment(),
        total_interest,
        total_cost: terms.principal() + total_interest,
        payments_made,
        balance_after: plan.balance_after(terms, payments_made),
    }
}

pub fn loan_summary(
    principal: f64,
    annual_rate: f64,
    term_years: f64,
    payments_made: u32,
) -> LoanResult<LoanSummary> {
    Ok(summarize(
        &validate(principal, annual_rate, term_years)?,
        payments_made,
    ))
}

/// Five years of payments, or the whole term when it is shorter.
pub fn default_checkpoint(terms: &LoanTerms) -> u32 {
    terms.months().min(DEFAULT_CHECKPOINT)
}

/// Balance after every payment count from 0 through the full term.
/// The payment is derived once and shared by all the closed-form queries.
pub fn balance_curve(terms: &LoanTerms) -> Vec<f64> {
    let plan = terms.payment_plan();
    debug!("balance curve over {} payments", terms.months());
    (0..=terms.months())
        .map(|made| plan.balance_after(terms, made))
        .collect()
}

impl fmt::Display for LoanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Loan Summary ===")?;
        writeln!(f, "Principal:            ${:.2}", self.principal)?;
        writeln!(f, "Annual rate:           {:.2}%", self.annual_rate)?;
        writeln!(
            f,
            "Term:                  {} years ({} months)",
            self.term_years, self.months
        )?;
        writeln!(f, "Monthly payment:      ${:.2}", self.monthly_payment)?;
        writeln!(f, "Total interest:       ${:.2}", self.total_interest)?;
        writeln!(f, "Total cost:           ${:.2}", self.total_cost)?;
        write!(
            f,
            "Balance after {} payments: ${:.2}",
            self.payments_made, self.balance_after
        )
    }
}
