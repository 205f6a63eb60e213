use crate::{compare::Comparison, trend::TrendReport};

#[derive(Clone, Debug, PartialEq)]
pub struct GateReport {
    pub passed: bool,
    pub reasons: Vec<String>,
}

impl GateReport {
    fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            passed: reasons.is_empty(),
            reasons,
        }
    }
}

/// Pass/fail policy for a baseline comparison.
///
/// Any metric over its category threshold fails the gate. In strict mode a
/// metric that got slower at all also fails it, whatever its threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegressionGate {
    strict: bool,
}

impl RegressionGate {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn evaluate(&self, comparison: &Comparison) -> GateReport {
        let mut reasons = Vec::new();
        if comparison.has_regressions() {
            let summary = comparison
                .regressions_by_category()
                .into_iter()
                .map(|(category, count)| format!("{count} {category}"))
                .collect::<Vec<_>>()
                .join(", ");
            reasons.push(format!(
                "{} regression(s): {summary}",
                comparison.regressed.len()
            ));
        }
        if self.strict {
            for result in comparison.unchanged.iter().filter(|r| r.diff_pct > 0.0) {
                reasons.push(format!(
                    "{} slower by {:.1}% (strict mode)",
                    result.name, result.diff_pct
                ));
            }
        }
        GateReport::from_reasons(reasons)
    }
}

/// Fails when trend analysis reports sustained regressions.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendGate;

impl TrendGate {
    pub fn evaluate(&self, report: &TrendReport) -> GateReport {
        let reasons = report
            .summary()
            .map(|summary| {
                summary
                    .sustained_regressions
                    .iter()
                    .map(|record| {
                        format!(
                            "{} sustained regression: {:+.1}% over {} runs",
                            record.name,
                            record.total_change_pct,
                            record.values.len()
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        GateReport::from_reasons(reasons)
    }
}
