pub mod chart;
pub mod error;
pub mod export;
pub mod loan;
pub mod schedule;
pub mod summary;

pub use error::{LoanError, LoanResult};
pub use loan::{Loan, LoanTerms, PaymentPlan};
pub use schedule::{generate_schedule, ScheduleEntry};
pub use summary::LoanSummary;
