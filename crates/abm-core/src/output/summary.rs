//! Run Summaries
//!
//! End-of-run reports for the bundled models, computed from the recorded
//! history and the final population.

use abm_data::{History, HistoryError, Tick};
use serde::Serialize;
use std::fmt;

use super::metrics::mean;

/// Final SIR counts and the infection peak
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpidemicSummary {
    pub ticks: Tick,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub peak_infected: f64,
    /// First tick at which `peak_infected` was reached
    pub peak_tick: Tick,
}

impl EpidemicSummary {
    pub fn from_history(history: &History) -> Result<Self, HistoryError> {
        let last = history.latest().ok_or(HistoryError::Empty)?;
        let final_of = |name: &str| {
            last.get(name)
                .ok_or_else(|| HistoryError::UnknownMetric(name.to_string()))
        };
        let peak = history.max_of("Infected")?;
        Ok(Self {
            ticks: last.tick,
            susceptible: final_of("Susceptible")?,
            infected: final_of("Infected")?,
            recovered: final_of("Recovered")?,
            peak_infected: peak.value,
            peak_tick: peak.tick,
        })
    }
}

/// Distribution of final wealth plus how inequality moved over the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WealthSummary {
    pub ticks: Tick,
    pub agents: usize,
    /// Widened so the sum of any set of `u64` holdings fits
    pub total: u128,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    pub initial_gini: f64,
    pub final_gini: f64,
}

fn median(sorted: &[u64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2] as f64,
        _ => (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0,
    }
}

impl WealthSummary {
    /// `wealths` is the final wealth of every agent; `history` must carry a
    /// `Gini` column.
    pub fn from_run(wealths: &[u64], history: &History) -> Result<Self, HistoryError> {
        let gini = history.column("Gini")?;
        let (Some(&initial_gini), Some(&final_gini)) = (gini.first(), gini.last()) else {
            return Err(HistoryError::Empty);
        };
        let ticks = history.latest().map(|s| s.tick).unwrap_or_default();

        let mut sorted = wealths.to_vec();
        sorted.sort_unstable();
        let values: Vec<f64> = sorted.iter().map(|&w| w as f64).collect();
        let mean = mean(&values);
        let variance = if values.is_empty() {
            0.0
        } else {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
        };

        Ok(Self {
            ticks,
            agents: sorted.len(),
            total: sorted.iter().map(|&w| u128::from(w)).sum(),
            mean,
            median: median(&sorted),
            std_dev: variance.sqrt(),
            min: sorted.first().copied().unwrap_or(0),
            max: sorted.last().copied().unwrap_or(0),
            initial_gini,
            final_gini,
        })
    }
}

/// Report of whichever model ran
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum RunSummary {
    Epidemic(EpidemicSummary),
    Wealth(WealthSummary),
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunSummary::Epidemic(s) => {
                writeln!(f, "Epidemic after {} ticks", s.ticks)?;
                writeln!(f, "  Susceptible: {}", s.susceptible)?;
                writeln!(f, "  Infected:    {}", s.infected)?;
                writeln!(f, "  Recovered:   {}", s.recovered)?;
                write!(
                    f,
                    "  Peak infection: {} at tick {}",
                    s.peak_infected, s.peak_tick
                )
            }
            RunSummary::Wealth(s) => {
                writeln!(f, "Wealth after {} ticks ({} agents)", s.ticks, s.agents)?;
                writeln!(f, "  Total:   {}", s.total)?;
                writeln!(f, "  Mean:    {:.2}", s.mean)?;
                writeln!(f, "  Median:  {:.2}", s.median)?;
                writeln!(f, "  Std dev: {:.2}", s.std_dev)?;
                writeln!(f, "  Min/Max: {} / {}", s.min, s.max)?;
                write!(
                    f,
                    "  Gini:    {:.3} -> {:.3}",
                    s.initial_gini, s.final_gini
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abm_data::fixtures::{epidemic_history, wealth_history};

    #[test]
    fn test_epidemic_peak_is_first_occurrence() {
        let summary = EpidemicSummary::from_history(&epidemic_history()).unwrap();
        assert_eq!(summary.peak_infected, 9.0);
        assert_eq!(summary.peak_tick, 3);
        assert_eq!(summary.ticks, 6);
        assert_eq!(
            (summary.susceptible, summary.infected, summary.recovered),
            (6.0, 0.0, 14.0)
        );
    }

    #[test]
    fn test_epidemic_summary_needs_sir_columns() {
        assert_eq!(
            EpidemicSummary::from_history(&History::default()),
            Err(HistoryError::Empty)
        );
        assert!(matches!(
            EpidemicSummary::from_history(&wealth_history()),
            Err(HistoryError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_wealth_statistics() {
        let wealths = [0, 2, 4, 4, 5, 5, 7, 9];
        let summary = WealthSummary::from_run(&wealths, &wealth_history()).unwrap();
        assert_eq!(summary.total, 36);
        assert_eq!(summary.mean, 4.5);
        assert_eq!(summary.median, 4.5);
        // squared deviations sum to 54, over 8
        assert!((summary.std_dev - 6.75f64.sqrt()).abs() < 1e-12);
        assert_eq!((summary.min, summary.max), (0, 9));
        assert_eq!((summary.initial_gini, summary.final_gini), (0.0, 0.42));
        assert_eq!(summary.ticks, 3);
    }

    #[test]
    fn test_total_of_huge_holdings() {
        let summary = WealthSummary::from_run(&[u64::MAX, u64::MAX, 1], &wealth_history()).unwrap();
        assert_eq!(summary.total, 2 * u128::from(u64::MAX) + 1);
        assert_eq!(summary.max, u64::MAX);
    }

    #[test]
    fn test_odd_median_and_serialized_tag() {
        let summary = WealthSummary::from_run(&[3, 1, 2], &wealth_history()).unwrap();
        assert_eq!(summary.median, 2.0);

        let json = serde_json::to_value(RunSummary::Wealth(summary)).unwrap();
        assert_eq!(json["model"], "wealth");
        assert_eq!(json["agents"], 3);
    }

    #[test]
    fn test_display_mentions_peak() {
        let summary = EpidemicSummary::from_history(&epidemic_history()).unwrap();
        let text = RunSummary::Epidemic(summary).to_string();
        assert!(text.contains("Peak infection: 9 at tick 3"));
    }
}
