use crate::error::LoanResult;
use crate::schedule::ScheduleEntry;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

pub const DEFAULT_CSV_FILE: &str = "amortization.csv";

pub const CSV_HEADERS: [&str; 5] = ["Month", "Payment", "Interest", "Principal", "Balance"];

/// Write the schedule as a flat CSV table, one row per month.
pub fn write_csv<W: io::Write>(schedule: &[ScheduleEntry], writer: W) -> LoanResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;
    for entry in schedule {
        wtr.write_record([
            entry.period.to_string(),
            format!("{:.2}", entry.payment),
            format!("{:.2}", entry.interest),
            format!("{:.2}", entry.principal_paid),
            format!("{:.2}", entry.ending_balance),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(schedule: &[ScheduleEntry], path: P) -> LoanResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(schedule, BufWriter::new(file))?;
    info!(
        "saved {} month amortization schedule to {}",
        schedule.len(),
        path.display()
    );
    Ok(())
}
