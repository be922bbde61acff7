use crate::error::LoanResult;
use crate::loan::{round, validate, LoanTerms, PaymentPlan, DEC_PLACES};
use chrono::{Months, NaiveDate};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// One month of an amortization schedule. Money fields are rounded to cents.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleEntry {
    pub period: u32,
    pub due_date: Option<NaiveDate>,
    pub payment: f64,
    pub interest: f64,
    pub principal_paid: f64,
    pub ending_balance: f64,
}

impl ScheduleEntry {
    pub fn new(
        period: u32,
        due_date: Option<NaiveDate>,
        payment: f64,
        interest: f64,
        principal_paid: f64,
        ending_balance: f64,
    ) -> Self {
        Self {
            period,
            due_date,
            payment,
            interest,
            principal_paid,
            ending_balance,
        }
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pmt number {}", self.period)?;
        if let Some(date) = self.due_date {
            write!(f, ", date {}", date)?;
        }
        write!(
            f,
            ", payment ${:.2}, interest paid ${:.2}, principal paid ${:.2}, ending balance ${:.2}",
            self.payment, self.interest, self.principal_paid, self.ending_balance
        )
    }
}

/// Validates the inputs and returns the full month-by-month schedule.
pub fn generate_schedule(
    principal: f64,
    annual_rate: f64,
    term_years: f64,
) -> LoanResult<Vec<ScheduleEntry>> {
    let terms = validate(principal, annual_rate, term_years)?;
    Ok(build_schedule(&terms, &terms.payment_plan(), None))
}

/// Runs the balance recurrence for every month of the term.
///
/// The recurrence carries full precision from one period to the next; only the
/// emitted fields are rounded. The balance is clamped at zero so floating-point
/// dust on the last period never shows up as a negative amount.
pub fn build_schedule(
    terms: &LoanTerms,
    plan: &PaymentPlan,
    first_pmt_date: Option<NaiveDate>,
) -> Vec<ScheduleEntry> {
    let monthly_rate = terms.monthly_rate();
    let pmt_amount = plan.monthly_payment();
    let mut sched_pmt = Vec::with_capacity(terms.months() as usize);
    let mut begin_balance = terms.principal();

    debug!(
        "building {} month schedule, monthly rate {}, payment {}",
        terms.months(),
        monthly_rate,
        pmt_amount
    );

    for pmt_number in 1..=terms.months() {
        let interest = begin_balance * monthly_rate;
        let principal_paid = pmt_amount - interest;
        let end_balance = (begin_balance - principal_paid).max(0.);
        trace!(
            "pmt # {}, interest {}, principal {}, end bal {}",
            pmt_number,
            interest,
            principal_paid,
            end_balance
        );

        sched_pmt.push(ScheduleEntry::new(
            pmt_number,
            first_pmt_date.and_then(|first| pmt_due_date(first, pmt_number)),
            round(pmt_amount, DEC_PLACES),
            round(interest, DEC_PLACES),
            round(principal_paid, DEC_PLACES),
            round(end_balance, DEC_PLACES),
        ));
        begin_balance = end_balance;
    }
    sched_pmt
}

/// Due date of payment `pmt_number` (1-based), stepping whole months from the
/// first payment. Month-end dates clamp to the last day of shorter months.
pub fn pmt_due_date(first_pmt_date: NaiveDate, pmt_number: u32) -> Option<NaiveDate> {
    first_pmt_date.checked_add_months(Months::new(pmt_number.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::{build_schedule, generate_schedule, pmt_due_date, ScheduleEntry};
    use crate::error::LoanError;
    use crate::loan::LoanTerms;
    use chrono::NaiveDate;
    use test_log::test;

    fn schedule_for(principal: f64, rate: f64, years: f64) -> Vec<ScheduleEntry> {
        generate_schedule(principal, rate, years).unwrap()
    }

    #[test]
    fn test_pmt_due_date() {
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(pmt_due_date(first, 1), Some(first));
        assert_eq!(
            pmt_due_date(first, 2),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            pmt_due_date(first, 13),
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );

        // month-end clamping does not drift later payments
        let first = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(
            pmt_due_date(first, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            pmt_due_date(first, 3),
            NaiveDate::from_ymd_opt(2023, 3, 31)
        );
    }

    #[test]
    fn test_thirty_year_schedule() {
        let sched = schedule_for(200000., 5., 30.);

        assert_eq!(sched.len(), 360);
        assert_eq!(
            sched[0],
            ScheduleEntry::new(1, None, 1073.64, 833.33, 240.31, 199759.69)
        );
        assert_eq!(
            sched[1],
            ScheduleEntry::new(2, None, 1073.64, 832.33, 241.31, 199518.38)
        );
        assert_eq!(sched[358].ending_balance, 1069.19);
        assert_eq!(sched[359].interest, 4.45);
        assert_eq!(sched[359].ending_balance, 0.);
    }

    #[test]
    fn test_zero_rate_schedule() {
        let sched = schedule_for(10000., 0., 1.);

        assert_eq!(sched.len(), 12);
        for entry in &sched {
            assert_eq!(entry.payment, 833.33);
            assert_eq!(entry.interest, 0.);
            assert_eq!(entry.principal_paid, 833.33);
        }
        assert_eq!(sched[0].ending_balance, 9166.67);
        assert_eq!(sched[11].ending_balance, 0.);
    }

    #[test]
    fn test_short_schedule() {
        let sched = schedule_for(1000., 12., 0.25);
        assert_eq!(
            sched,
            vec![
                ScheduleEntry::new(1, None, 340.02, 10., 330.02, 669.98),
                ScheduleEntry::new(2, None, 340.02, 6.7, 333.32, 336.66),
                ScheduleEntry::new(3, None, 340.02, 3.37, 336.66, 0.),
            ]
        );
    }

    #[test]
    fn test_schedule_properties() {
        for (principal, rate, years) in [
            (200000., 5., 30.),
            (300000., 6., 30.),
            (25000., 5.5, 5.),
            (60000., 4.2, 10.),
            (180000., 3.9, 15.),
            (10000., 0., 1.),
            (5000., 0., 3.),
            (750., 19.99, 0.5),
            (1_000_000., 25., 40.),
            (200000., 30., 30.),
            (200000., 50., 30.),
            (1e9, 5., 30.),
            (10000., 1e-12, 1.),
        ] {
            let terms = LoanTerms::new(principal, rate, years).unwrap();
            let sched = build_schedule(&terms, &terms.payment_plan(), None);
            let months = terms.months() as usize;

            assert_eq!(sched.len(), months);
            for (idx, entry) in sched.iter().enumerate() {
                assert_eq!(entry.period as usize, idx + 1);
                assert_eq!(entry.payment, sched[0].payment);
                assert!(entry.ending_balance >= 0.);
            }
            assert_eq!(sched[months - 1].ending_balance, 0.);

            // summing cent-rounded fields drifts by a few cents over a long term
            let principal_sum: f64 = sched.iter().map(|e| e.principal_paid).sum();
            assert!(
                (principal_sum - principal).abs() <= 0.25,
                "principal paid {} vs {}",
                principal_sum,
                principal
            );
        }
    }

    #[test]
    fn test_schedule_matches_closed_form() {
        for (principal, rate, years) in [
            (200000., 5., 30.),
            (300000., 5., 30.),
            (25000., 5.5, 5.),
            (1000., 12., 0.25),
            (200000., 50., 30.),
            (10000., 1e-12, 1.),
        ] {
            let terms = LoanTerms::new(principal, rate, years).unwrap();
            let plan = terms.payment_plan();
            let sched = build_schedule(&terms, &plan, None);

            for k in 1..=terms.months() {
                let closed_form = plan.balance_after(&terms, k);
                let iterated = sched[k as usize - 1].ending_balance;
                assert!(
                    (closed_form - iterated).abs() <= 0.01,
                    "period {}: closed form {} vs iterated {}",
                    k,
                    closed_form,
                    iterated
                );
            }
        }

        let terms = LoanTerms::new(300000., 5., 30.).unwrap();
        let sched = build_schedule(&terms, &terms.payment_plan(), None);
        assert_eq!(sched[59].ending_balance, 275486.2);
        assert!((terms.remaining_balance(60) - sched[59].ending_balance).abs() <= 0.01);
    }

    #[test]
    fn test_dated_schedule() {
        let terms = LoanTerms::new(25000., 5.5, 5.).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let sched = build_schedule(&terms, &terms.payment_plan(), Some(first));

        assert_eq!(sched[0].due_date, Some(first));
        assert_eq!(sched[59].due_date, NaiveDate::from_ymd_opt(2029, 3, 1));
        assert_eq!(
            sched[0].to_string(),
            "pmt number 1, date 2024-04-01, payment $477.53, interest paid $114.58, principal paid $362.95, ending balance $24637.05"
        );
    }

    #[test]
    fn test_generate_schedule_rejects_invalid_input() {
        for (principal, rate, years) in [(0., 5., 30.), (-100., 5., 30.), (1000., -1., 30.), (1000., 5., 0.)] {
            assert!(matches!(
                generate_schedule(principal, rate, years),
                Err(LoanError::InvalidInput { .. })
            ));
        }
    }
}
