//! Objective composition.
//!
//! ```text
//! f(w) = -(w · μ) + λ × risk(w) + Σ_k c_k × penalty_k(w)
//! ```
//!
//! where `λ` is the risk tolerance and `c_k` the coefficient of each
//! enabled penalty term.

use ballast_math::optimization::Objective;
use nalgebra::DVector;
use serde::Serialize;

use crate::error::{PortfolioError, PortfolioResult};
use crate::penalties::{PenaltyContext, PenaltyTerm};
use crate::types::PenaltyConfig;

/// Per-term decomposition of the objective at one weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectiveBreakdown {
    /// `w · μ`.
    pub expected_return: f64,
    /// `sqrt(wᵀ Σ w)`.
    pub risk: f64,
    /// `λ × risk`.
    pub risk_penalty: f64,
    /// Scaled tax-cost term, if enabled.
    pub tax_penalty: Option<f64>,
    /// Scaled ESG term, if enabled.
    pub esg_penalty: Option<f64>,
    /// The objective value.
    pub total: f64,
}

/// Combines expected return, risk and the enabled penalties into one
/// scalar to minimize.
#[derive(Debug, Clone)]
pub struct ObjectiveComposer {
    expected_returns: DVector<f64>,
    risk_tolerance: f64,
    context: PenaltyContext,
    penalties: Vec<(PenaltyTerm, f64)>,
}

impl ObjectiveComposer {
    /// Creates a composer.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `risk_tolerance` is negative or not finite, a
    ///   coefficient is invalid, or `expected_returns` does not match the context.
    pub fn new(
        expected_returns: DVector<f64>,
        risk_tolerance: f64,
        context: PenaltyContext,
        config: &PenaltyConfig,
    ) -> PortfolioResult<Self> {
        if !(risk_tolerance.is_finite() && risk_tolerance >= 0.0) {
            return Err(PortfolioError::invalid_input(format!(
                "risk tolerance must be a non-negative number, got {risk_tolerance}"
            )));
        }
        if expected_returns.len() != context.len() {
            return Err(PortfolioError::invalid_input(format!(
                "{} expected returns for {} assets",
                expected_returns.len(),
                context.len()
            )));
        }
        config.validate()?;

        let penalties = [
            (PenaltyTerm::TaxCost, config.tax.active()),
            (PenaltyTerm::Esg, config.esg.active()),
        ]
        .into_iter()
        .filter_map(|(term, coefficient)| coefficient.map(|c| (term, c)))
        .collect();

        Ok(Self {
            expected_returns,
            risk_tolerance,
            context,
            penalties,
        })
    }

    /// Number of assets.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.expected_returns.len()
    }

    /// The risk tolerance `λ`.
    #[must_use]
    pub fn risk_tolerance(&self) -> f64 {
        self.risk_tolerance
    }

    /// Enabled penalty terms with their coefficients.
    #[must_use]
    pub fn penalties(&self) -> &[(PenaltyTerm, f64)] {
        &self.penalties
    }

    /// Objective value at `weights`.
    #[must_use]
    pub fn compose(&self, weights: &DVector<f64>) -> f64 {
        let mut total = -weights.dot(&self.expected_returns)
            + self.risk_tolerance * PenaltyTerm::Risk.value(weights, &self.context);
        for (term, coefficient) in &self.penalties {
            total += coefficient * term.value(weights, &self.context);
        }
        total
    }

    /// Gradient of [`compose`](Self::compose).
    #[must_use]
    pub fn compose_gradient(&self, weights: &DVector<f64>) -> DVector<f64> {
        let mut gradient = -&self.expected_returns;
        if self.risk_tolerance > 0.0 {
            gradient += PenaltyTerm::Risk.gradient(weights, &self.context) * self.risk_tolerance;
        }
        for (term, coefficient) in &self.penalties {
            gradient += term.gradient(weights, &self.context) * *coefficient;
        }
        gradient
    }

    /// Per-term decomposition at `weights`.
    #[must_use]
    pub fn breakdown(&self, weights: &DVector<f64>) -> ObjectiveBreakdown {
        let scaled = |target: PenaltyTerm| {
            self.penalties
                .iter()
                .find(|(term, _)| *term == target)
                .map(|(term, c)| c * term.value(weights, &self.context))
        };
        let risk = PenaltyTerm::Risk.value(weights, &self.context);
        ObjectiveBreakdown {
            expected_return: weights.dot(&self.expected_returns),
            risk,
            risk_penalty: self.risk_tolerance * risk,
            tax_penalty: scaled(PenaltyTerm::TaxCost),
            esg_penalty: scaled(PenaltyTerm::Esg),
            total: self.compose(weights),
        }
    }
}

impl Objective for ObjectiveComposer {
    fn value(&self, x: &[f64]) -> f64 {
        self.compose(&DVector::from_column_slice(x))
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        self.compose_gradient(&DVector::from_column_slice(x))
            .as_slice()
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EsgPolicy, TermConfig};
    use approx::assert_relative_eq;
    use ballast_core::{Asset, Date};
    use ballast_math::optimization::central_difference;
    use nalgebra::DMatrix;

    fn setup(config: &PenaltyConfig, risk_tolerance: f64) -> PortfolioResult<ObjectiveComposer> {
        let purchase = Date::from_ymd(2023, 1, 1).unwrap();
        let as_of = Date::from_ymd(2023, 6, 1).unwrap();
        let owned = [
            Asset::new("A", 10, 50.0, purchase)
                .unwrap()
                .with_esg_score(70.0)
                .unwrap(),
            Asset::new("B", 20, 25.0, purchase)
                .unwrap()
                .with_esg_score(90.0)
                .unwrap(),
            Asset::new("C", 5, 100.0, purchase)
                .unwrap()
                .with_esg_score(50.0)
                .unwrap(),
        ];
        let refs: Vec<&Asset> = owned.iter().collect();
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[0.04, 0.006, 0.002, 0.006, 0.09, 0.01, 0.002, 0.01, 0.01],
        );
        let ctx = PenaltyContext::build(&refs, cov, config, as_of)?;
        ObjectiveComposer::new(
            DVector::from_vec(vec![0.010, 0.015, 0.005]),
            risk_tolerance,
            ctx,
            config,
        )
    }

    #[test]
    fn test_pure_mean_risk() {
        let composer = setup(&PenaltyConfig::none(), 0.5).unwrap();
        let w = DVector::from_vec(vec![0.2, 0.3, 0.5]);

        let mu = 0.2 * 0.010 + 0.3 * 0.015 + 0.5 * 0.005;
        let var: f64 = 0.04 * 0.04
            + 0.09 * 0.09
            + 0.01 * 0.25
            + 2.0 * (0.006 * 0.06 + 0.002 * 0.1 + 0.01 * 0.15);
        let expected = -mu + 0.5 * var.sqrt();

        assert_relative_eq!(composer.compose(&w), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let composer = setup(&PenaltyConfig::new(), 0.3).unwrap();
        let w = DVector::from_vec(vec![0.3, 0.3, 0.4]);

        let b = composer.breakdown(&w);

        let sum = -b.expected_return
            + b.risk_penalty
            + b.tax_penalty.unwrap_or(0.0)
            + b.esg_penalty.unwrap_or(0.0);
        assert_relative_eq!(sum, b.total, epsilon = 1e-12);
        // All scored: 100 - (0.3 × 70 + 0.3 × 90 + 0.4 × 50) = 32
        assert_relative_eq!(b.esg_penalty.unwrap(), 32.0, epsilon = 1e-10);
        // All short-term US: 0.25 × Σ w_i × value_i / total
        assert_relative_eq!(
            b.tax_penalty.unwrap(),
            0.25 * (0.3 + 0.3 + 0.4) / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_disabled_terms_absent() {
        let config = PenaltyConfig::new().with_tax(TermConfig::disabled());
        let composer = setup(&config, 0.1).unwrap();

        assert_eq!(composer.penalties(), &[(PenaltyTerm::Esg, 1.0)]);
        let b = composer.breakdown(&DVector::from_vec(vec![0.3, 0.3, 0.4]));
        assert!(b.tax_penalty.is_none());
        assert!(b.esg_penalty.is_some());
    }

    #[test]
    fn test_coefficient_scales_term() {
        let w = DVector::from_vec(vec![0.3, 0.3, 0.4]);
        let base = setup(&PenaltyConfig::new(), 0.1).unwrap().breakdown(&w);
        let scaled_config = PenaltyConfig::new().with_esg(TermConfig {
            enabled: true,
            coefficient: 0.01,
        });
        let scaled = setup(&scaled_config, 0.1).unwrap().breakdown(&w);

        assert_relative_eq!(
            scaled.esg_penalty.unwrap(),
            0.01 * base.esg_penalty.unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_analytic_gradient_matches_numerical() {
        let config = PenaltyConfig::new().with_esg_policy(EsgPolicy::Default(60.0));
        let composer = setup(&config, 0.7).unwrap();
        let x = [0.25, 0.35, 0.40];

        let analytic = composer.gradient(&x);
        let numerical = central_difference(|p| composer.value(p), &x, 1e-6);

        for (a, n) in analytic.iter().zip(&numerical) {
            assert_relative_eq!(*a, *n, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_negative_risk_tolerance_rejected() {
        assert!(matches!(
            setup(&PenaltyConfig::new(), -0.1),
            Err(PortfolioError::InvalidInput { .. })
        ));
        assert!(setup(&PenaltyConfig::new(), f64::NAN).is_err());
    }
}
