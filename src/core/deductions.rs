//! Statutory deductions - INSS social security and IRT income tax.
//!
//! Pure functions of a non-negative monetary base. Callers guarantee the base
//! is a sum of non-negative amounts; negative input is not handled here.

/// Employee share of social security
pub const EMPLOYEE_INSS_RATE: f64 = 0.03;
/// Employer share of social security, reported but never deducted from pay
pub const EMPLOYER_INSS_RATE: f64 = 0.08;

/// One tier of the IRT schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    /// Inclusive upper bound of the taxable amount; `None` for the top tier
    pub upper_bound: Option<f64>,
    /// Taxable amount where the tier starts
    pub threshold: f64,
    /// Marginal rate applied above `threshold`
    pub rate: f64,
    /// Maximum tax of the previous tier
    pub base_tax: f64,
}

/// IRT schedule, evaluated top-down on the first matching inclusive bound.
pub const IRT_BRACKETS: [TaxBracket; 5] = [
    TaxBracket {
        upper_bound: Some(50_000.0),
        threshold: 0.0,
        rate: 0.0,
        base_tax: 0.0,
    },
    TaxBracket {
        upper_bound: Some(150_000.0),
        threshold: 50_000.0,
        rate: 0.10,
        base_tax: 0.0,
    },
    TaxBracket {
        upper_bound: Some(250_000.0),
        threshold: 150_000.0,
        rate: 0.15,
        base_tax: 10_000.0,
    },
    TaxBracket {
        upper_bound: Some(500_000.0),
        threshold: 250_000.0,
        rate: 0.20,
        base_tax: 25_000.0,
    },
    TaxBracket {
        upper_bound: None,
        threshold: 500_000.0,
        rate: 0.25,
        base_tax: 75_000.0,
    },
];

impl TaxBracket {
    fn contains(&self, taxable: f64) -> bool {
        self.upper_bound.is_none_or(|bound| taxable <= bound)
    }

    fn tax(&self, taxable: f64) -> f64 {
        if self.rate == 0.0 {
            return self.base_tax;
        }
        (taxable - self.threshold) * self.rate + self.base_tax
    }
}

/// Employee INSS withholding: 3% of the gross base.
#[must_use]
pub fn social_security_contribution(gross_base: f64) -> f64 {
    gross_base * EMPLOYEE_INSS_RATE
}

/// Employer INSS charge: 8% of the gross base.
#[must_use]
pub fn employer_social_security_contribution(gross_base: f64) -> f64 {
    gross_base * EMPLOYER_INSS_RATE
}

/// Progressive IRT on `gross_base - social_security`.
///
/// A taxable amount of exactly 50,000 pays nothing; 50,000.01 enters the 10% tier.
#[must_use]
pub fn progressive_income_tax(gross_base: f64, social_security: f64) -> f64 {
    let taxable = gross_base - social_security;
    IRT_BRACKETS
        .iter()
        .find(|bracket| bracket.contains(taxable))
        .map_or(0.0, |bracket| bracket.tax(taxable))
}
