mod profiles;

use amortize::chart::{write_series, ChartView};
use amortize::export::{export_csv, DEFAULT_CSV_FILE};
use amortize::loan::{validate, validate_payments_made};
use amortize::summary::{default_checkpoint, summarize};
use amortize::{Loan, LoanError, LoanResult, LoanTerms};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;
use std::io;
use std::path::PathBuf;
use std::process;

/// Fixed-rate loan amortization calculator
#[derive(Parser, Debug)]
#[command(
    name = "amortize",
    version,
    about = "Fixed-rate loan amortization calculator",
    long_about = "Calculates the fixed monthly payment of a loan, builds its month-by-month \
                  amortization schedule, and reports total interest, total cost and the \
                  remaining balance after any number of payments."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more detail (-v debug, -vv per-payment trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Monthly payment, totals and the balance after a number of payments
    Summary {
        #[command(flatten)]
        loan: LoanArgs,
        /// Payments already made (default: 60, or the full term if shorter)
        #[arg(long, allow_negative_numbers = true)]
        after: Option<f64>,
    },
    /// Print the full amortization schedule, optionally saving it as CSV
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,
        /// Write the schedule to a CSV file
        #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_CSV_FILE)]
        csv: Option<PathBuf>,
        /// Due date of the first payment (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Print one chart series as CSV for an external plotter
    Chart {
        #[command(flatten)]
        loan: LoanArgs,
        #[arg(long, value_enum, default_value = "balance")]
        view: View,
    },
    /// List the preset loan profiles
    Profiles,
}

#[derive(Args, Debug)]
struct LoanArgs {
    /// Amount borrowed
    #[arg(long, allow_negative_numbers = true, required_unless_present = "profile")]
    principal: Option<f64>,
    /// Annual interest rate in percent (5 means 5%)
    #[arg(long, allow_negative_numbers = true, required_unless_present = "profile")]
    rate: Option<f64>,
    /// Loan term in years
    #[arg(long, allow_negative_numbers = true, required_unless_present = "profile")]
    years: Option<f64>,
    /// Use a preset profile by name or list number instead of explicit terms
    #[arg(long, conflicts_with_all = ["principal", "rate", "years"])]
    profile: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum View {
    Balance,
    Split,
    Cumulative,
}

impl From<View> for ChartView {
    fn from(view: View) -> Self {
        match view {
            View::Balance => ChartView::Balance,
            View::Split => ChartView::Split,
            View::Cumulative => ChartView::Cumulative,
        }
    }
}

impl LoanArgs {
    fn resolve(&self) -> LoanResult<LoanTerms> {
        if let Some(key) = &self.profile {
            let profile = profiles::find(key).ok_or_else(|| {
                LoanError::invalid("profile", format!("no preset named '{}'", key))
            })?;
            debug!("using profile {}", profile.label);
            return profile.terms();
        }

        match (self.principal, self.rate, self.years) {
            (Some(principal), Some(rate), Some(years)) => validate(principal, rate, years),
            _ => Err(LoanError::invalid(
                "loan",
                "--principal, --rate and --years are required without --profile",
            )),
        }
    }
}

fn run_summary(loan: &LoanArgs, after: Option<f64>) -> LoanResult<()> {
    let terms = loan.resolve()?;
    let payments_made = match after {
        Some(value) => validate_payments_made(value)?,
        None => default_checkpoint(&terms),
    };
    println!("{}", summarize(&terms, payments_made));
    Ok(())
}

fn run_schedule(loan: &LoanArgs, csv: Option<PathBuf>, start: Option<NaiveDate>) -> LoanResult<()> {
    let terms = loan.resolve()?;
    let loan = match start {
        Some(first_pmt_date) => Loan::with_first_pmt_date(terms, first_pmt_date),
        None => Loan::new(terms),
    };

    println!("{}", loan.terms());
    for pmt in loan.schedule() {
        println!("{}", pmt);
    }

    if let Some(path) = csv {
        export_csv(loan.schedule(), &path)?;
        println!("Saved amortization schedule to {}", path.display());
    }
    Ok(())
}

fn run_chart(loan: &LoanArgs, view: View) -> LoanResult<()> {
    let terms = loan.resolve()?;
    let loan = Loan::new(terms);
    write_series(loan.schedule(), view.into(), io::stdout().lock())
}

fn run_profiles() {
    for (idx, profile) in profiles::PROFILES.iter().enumerate() {
        println!("{}) {}", idx + 1, profile);
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result = match cli.command {
        Commands::Summary { loan, after } => run_summary(&loan, after),
        Commands::Schedule { loan, csv, start } => run_schedule(&loan, csv, start),
        Commands::Chart { loan, view } => run_chart(&loan, view),
        Commands::Profiles => {
            run_profiles();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, View};
    use amortize::{Loan, LoanError, LoanTerms, ScheduleEntry};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;
    use test_log::test;

    // verifies that types can implement the gated traits below
    fn is_normal<T: Sized + Send + Sync + Unpin>() {}

    #[test]
    fn normal_types() {
        is_normal::<ScheduleEntry>();
        is_normal::<LoanTerms>();
        is_normal::<Loan>();
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_explicit_terms() {
        let cli = Cli::try_parse_from([
            "amortize", "summary", "--principal", "300000", "--rate", "5", "--years", "30",
            "--after", "60",
        ])
        .unwrap();
        match cli.command {
            Commands::Summary { loan, after } => {
                let terms = loan.resolve().unwrap();
                assert_eq!(terms.principal(), 300000.);
                assert_eq!(terms.months(), 360);
                assert_eq!(after, Some(60.));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_profile_terms() {
        let cli =
            Cli::try_parse_from(["amortize", "chart", "--profile", "car-loan", "--view", "split"])
                .unwrap();
        match cli.command {
            Commands::Chart { loan, view } => {
                assert_eq!(view, View::Split);
                let terms = loan.resolve().unwrap();
                assert_eq!(terms.principal(), 25000.);
                assert_eq!(terms.months(), 60);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_profile() {
        let cli = Cli::try_parse_from(["amortize", "summary", "--profile", "yacht"]).unwrap();
        match cli.command {
            Commands::Summary { loan, .. } => {
                assert!(matches!(
                    loan.resolve(),
                    Err(LoanError::InvalidInput { .. })
                ));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_rate_reaches_validation() {
        let cli = Cli::try_parse_from([
            "amortize", "summary", "--principal", "1000", "--rate", "-1", "--years", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Summary { loan, .. } => {
                assert!(matches!(
                    loan.resolve(),
                    Err(LoanError::InvalidInput { field, .. }) if field == "annual_rate"
                ));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_profile_conflicts_with_terms() {
        assert!(Cli::try_parse_from([
            "amortize", "summary", "--profile", "car-loan", "--principal", "1000",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["amortize", "summary", "--principal", "1000"]).is_err());
    }

    #[test]
    fn test_schedule_csv_default_path() {
        let cli = Cli::try_parse_from(["amortize", "schedule", "--profile", "1", "--csv"]).unwrap();
        match cli.command {
            Commands::Schedule { csv, start, .. } => {
                assert_eq!(csv, Some(PathBuf::from("amortization.csv")));
                assert!(start.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "amortize", "schedule", "--profile", "1", "--csv", "out.csv", "--start", "2024-04-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Schedule { csv, start, .. } => {
                assert_eq!(csv, Some(PathBuf::from("out.csv")));
                assert_eq!(start.unwrap().to_string(), "2024-04-01");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
