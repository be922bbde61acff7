use amortize::{LoanResult, LoanTerms};
use std::fmt;

/// A named preset loan for quick demos.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Profile {
    pub name: &'static str,
    pub label: &'static str,
    pub principal: f64,
    pub annual_rate: f64,
    pub term_years: f64,
}

pub const PROFILES: [Profile; 4] = [
    Profile {
        name: "starter-home",
        label: "Starter Home",
        principal: 300000.,
        annual_rate: 6.,
        term_years: 30.,
    },
    Profile {
        name: "car-loan",
        label: "Car Loan",
        principal: 25000.,
        annual_rate: 5.5,
        term_years: 5.,
    },
    Profile {
        name: "student-refi",
        label: "Student Refi",
        principal: 60000.,
        annual_rate: 4.2,
        term_years: 10.,
    },
    Profile {
        name: "aggressive-paydown",
        label: "Aggressive Paydown",
        principal: 180000.,
        annual_rate: 3.9,
        term_years: 15.,
    },
];

/// Look a profile up by name (case-insensitive) or by its 1-based list position.
pub fn find(key: &str) -> Option<&'static Profile> {
    let key = key.trim();
    if let Ok(idx) = key.parse::<usize>() {
        return idx.checked_sub(1).and_then(|i| PROFILES.get(i));
    }
    PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(key) || p.label.eq_ignore_ascii_case(key))
}

impl Profile {
    pub fn terms(&self) -> LoanResult<LoanTerms> {
        LoanTerms::new(self.principal, self.annual_rate, self.term_years)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:<18} ${:>10.0} | {:>4.2}% | {} yrs",
            self.name, self.label, self.principal, self.annual_rate, self.term_years
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{find, PROFILES};
    use test_log::test;

    #[test]
    fn test_profiles_are_valid() {
        for profile in &PROFILES {
            assert!(profile.terms().is_ok(), "{} is invalid", profile.name);
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("car-loan").unwrap().principal, 25000.);
        assert_eq!(find("Starter Home").unwrap().term_years, 30.);
        assert_eq!(find("STUDENT-REFI").unwrap().annual_rate, 4.2);
        assert_eq!(find("4").unwrap().name, "aggressive-paydown");
        assert!(find("0").is_none());
        assert!(find("5").is_none());
        assert!(find("yacht").is_none());
    }
}
