use crate::error::{LoanError, LoanResult};
use crate::schedule::{build_schedule, ScheduleEntry};
use crate::summary::{summarize, LoanSummary};
use chrono::NaiveDate;
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used for every emitted money field.
pub const DEC_PLACES: f64 = 2.;

/// Longest supported term, in monthly payments.
pub const MAX_MONTHS: u32 = 12_000;

/// Largest floating-point drift the final balance may carry and still round to zero.
pub const BALANCE_TOLERANCE: f64 = 0.005;

/// Validated loan parameters. The only way to build one is through [`validate`],
/// so every method below is defined on known-good input.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawLoanTerms")
)]
pub struct LoanTerms {
    principal: f64,
    annual_rate: f64,
    term_years: f64,
    months: u32,
}

// deserialized terms go through `validate` like any other input
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawLoanTerms {
    principal: f64,
    annual_rate: f64,
    term_years: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLoanTerms> for LoanTerms {
    type Error = LoanError;

    fn try_from(raw: RawLoanTerms) -> LoanResult<Self> {
        validate(raw.principal, raw.annual_rate, raw.term_years)
    }
}

/// The fixed payment that retires a [`LoanTerms`] in exactly `months` periods.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaymentPlan {
    monthly_payment: f64,
}

/// Checks the raw loan inputs and derives the payment count.
///
/// * `principal` - amount borrowed, must be > 0
/// * `annual_rate` - nominal yearly rate in percent (5.0 is 5%), must be >= 0
/// * `term_years` - loan term in years, must be > 0 and round (half to even) to at least one month
///
/// Rates whose compounding over the term would leave more than
/// [`BALANCE_TOLERANCE`] of floating-point drift in the final balance are rejected.
pub fn validate(principal: f64, annual_rate: f64, term_years: f64) -> LoanResult<LoanTerms> {
    for (field, value) in [
        ("principal", principal),
        ("annual_rate", annual_rate),
        ("term_years", term_years),
    ] {
        if !value.is_finite() {
            return Err(LoanError::invalid(
                field,
                format!("must be a number, got {}", value),
            ));
        }
    }

    if principal <= 0. {
        return Err(LoanError::invalid("principal", "must be greater than 0"));
    }
    if annual_rate < 0. {
        return Err(LoanError::invalid("annual_rate", "cannot be negative"));
    }
    if term_years <= 0. {
        return Err(LoanError::invalid("term_years", "must be greater than 0"));
    }

    let months = (term_years * 12.).round_ties_even();
    if months < 1. {
        return Err(LoanError::invalid(
            "term_years",
            "loan term must result in at least 1 month of payments",
        ));
    }
    if months > MAX_MONTHS as f64 {
        return Err(LoanError::invalid(
            "term_years",
            format!("loan term cannot exceed {} months", MAX_MONTHS),
        ));
    }

    let terms = LoanTerms {
        principal,
        annual_rate,
        term_years,
        months: months as u32,
    };

    // error in the balance recurrence grows with (1+r)^n
    let drift = terms.balance_drift();
    if drift > BALANCE_TOLERANCE {
        return Err(LoanError::invalid(
            "annual_rate",
            format!(
                "{}% over {} months compounds too far to amortize to the cent (drift {:e})",
                annual_rate, terms.months, drift
            ),
        ));
    }

    debug!(
        "validated loan: principal {}, rate {}%, {} years -> {} months",
        principal, annual_rate, term_years, months
    );

    Ok(terms)
}

/// Converts a numeric payment count into a whole number of payments.
/// Fractional, negative and non-finite values are rejected.
pub fn validate_payments_made(value: f64) -> LoanResult<u32> {
    if !value.is_finite() {
        return Err(LoanError::invalid(
            "payments_made",
            format!("must be a number, got {}", value),
        ));
    }
    if value < 0. {
        return Err(LoanError::invalid("payments_made", "cannot be negative"));
    }
    if value.fract() != 0. {
        return Err(LoanError::invalid(
            "payments_made",
            format!("must be a whole number of payments, got {}", value),
        ));
    }
    if value > u32::MAX as f64 {
        return Err(LoanError::invalid("payments_made", "is too large"));
    }
    Ok(value as u32)
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, term_years: f64) -> LoanResult<Self> {
        validate(principal, annual_rate, term_years)
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn term_years(&self) -> f64 {
        self.term_years
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    /// Annual percent rate as a per-month fraction. Zero for interest-free loans.
    pub fn monthly_rate(&self) -> f64 {
        (self.annual_rate / 100.) / 12.
    }

    /// Upper estimate of the rounding error left in the final balance.
    fn balance_drift(&self) -> f64 {
        let monthly_rate = self.monthly_rate();
        if is_interest_free(monthly_rate) {
            return 0.;
        }
        let growth = (self.months as f64 * monthly_rate.ln_1p()).exp();
        f64::EPSILON * self.principal * growth * (1. + 1. / monthly_rate)
    }

    pub fn payment_plan(&self) -> PaymentPlan {
        PaymentPlan {
            monthly_payment: get_pmt_amount(self.principal, self.monthly_rate(), self.months),
        }
    }

    pub fn monthly_payment(&self) -> f64 {
        self.payment_plan().monthly_payment
    }

    /// Outstanding principal after `payments_made` payments, from the closed form
    /// of the balance recurrence. Zero once the term is reached.
    pub fn remaining_balance(&self, payments_made: u32) -> f64 {
        self.payment_plan().balance_after(self, payments_made)
    }

    pub fn total_interest(&self) -> f64 {
        self.payment_plan().total_interest(self)
    }

    pub fn total_cost(&self) -> f64 {
        self.principal + self.total_interest()
    }
}

impl fmt::Display for LoanTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal ${:.2}, rate {:.2}%, term {} years ({} months)",
            self.principal, self.annual_rate, self.term_years, self.months
        )
    }
}

impl PaymentPlan {
    pub fn monthly_payment(&self) -> f64 {
        self.monthly_payment
    }

    /// Closed-form balance: `P(1+r)^k - M((1+r)^k - 1)/r`, or `P - Mk` when r is zero.
    /// Reuses this plan's payment, so bulk queries derive it only once.
    pub fn balance_after(&self, terms: &LoanTerms, payments_made: u32) -> f64 {
        if payments_made >= terms.months {
            if payments_made > terms.months {
                warn!(
                    "{} payments requested on a {} month loan, balance is zero",
                    payments_made, terms.months
                );
            }
            return 0.;
        }

        let monthly_rate = terms.monthly_rate();
        let made = payments_made as f64;

        if is_interest_free(monthly_rate) {
            return (terms.principal - self.monthly_payment * made).max(0.);
        }

        let growth = made * monthly_rate.ln_1p();
        let factor = growth.exp();
        // (1+r)^k - 1 without cancellation for small rates
        let factor_less_one = growth.exp_m1();
        (terms.principal * factor - self.monthly_payment * factor_less_one / monthly_rate).max(0.)
    }

    pub fn total_interest(&self, terms: &LoanTerms) -> f64 {
        self.monthly_payment * terms.months as f64 - terms.principal
    }
}

pub fn monthly_payment(principal: f64, annual_rate: f64, term_years: f64) -> LoanResult<f64> {
    Ok(validate(principal, annual_rate, term_years)?.monthly_payment())
}

pub fn remaining_balance(
    principal: f64,
    annual_rate: f64,
    term_years: f64,
    payments_made: u32,
) -> LoanResult<f64> {
    Ok(validate(principal, annual_rate, term_years)?.remaining_balance(payments_made))
}

pub fn total_interest(principal: f64, annual_rate: f64, term_years: f64) -> LoanResult<f64> {
    Ok(validate(principal, annual_rate, term_years)?.total_interest())
}

pub fn total_cost(principal: f64, annual_rate: f64, term_years: f64) -> LoanResult<f64> {
    Ok(validate(principal, annual_rate, term_years)?.total_cost())
}

/// A loan together with its fixed payment and full amortization schedule.
#[derive(PartialEq, Debug)]
pub struct Loan {
    terms: LoanTerms,
    plan: PaymentPlan,
    first_pmt_date: Option<NaiveDate>,
    scheduled_pmts: Vec<ScheduleEntry>,
}

impl Loan {
    pub fn new(terms: LoanTerms) -> Self {
        Self::build(terms, None)
    }

    /// Same as [`Loan::new`], with each payment dated one month after the previous.
    pub fn with_first_pmt_date(terms: LoanTerms, first_pmt_date: NaiveDate) -> Self {
        Self::build(terms, Some(first_pmt_date))
    }

    fn build(terms: LoanTerms, first_pmt_date: Option<NaiveDate>) -> Self {
        let plan = terms.payment_plan();
        Self {
            terms,
            plan,
            first_pmt_date,
            scheduled_pmts: build_schedule(&terms, &plan, first_pmt_date),
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn plan(&self) -> &PaymentPlan {
        &self.plan
    }

    pub fn first_pmt_date(&self) -> Option<NaiveDate> {
        self.first_pmt_date
    }

    pub fn pmt_amount(&self) -> f64 {
        self.plan.monthly_payment
    }

    pub fn pmt_count(&self) -> usize {
        self.scheduled_pmts.len()
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.scheduled_pmts
    }

    /// Payment `pmt_number`, counting from 1.
    pub fn pmt_detail(&self, pmt_number: usize) -> Option<&ScheduleEntry> {
        pmt_number
            .checked_sub(1)
            .and_then(|idx| self.scheduled_pmts.get(idx))
    }

    pub fn pmt_info(&self, pmt_number: usize) -> String {
        match self.pmt_detail(pmt_number) {
            Some(pmt) => pmt.to_string(),
            None => "No payment information.".to_string(),
        }
    }

    pub fn summary(&self, payments_made: u32) -> LoanSummary {
        summarize(&self.terms, payments_made)
    }
}

/// Rounds `amt` to `dec` decimal places, half away from zero.
pub fn round(amt: f64, dec: f64) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec)
    }
}

// rates below the normal f64 range are amortized as interest-free
fn is_interest_free(monthly_rate: f64) -> bool {
    monthly_rate < f64::MIN_POSITIVE
}

// standard annuity payment; straight-line when the loan carries no interest
fn get_pmt_amount(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if is_interest_free(monthly_rate) {
        return principal / months as f64;
    }
    // 1 - (1+r)^-n, computed in log space so tiny rates keep their precision
    let discount = -(-(months as f64) * monthly_rate.ln_1p()).exp_m1();
    principal * monthly_rate / discount
}
