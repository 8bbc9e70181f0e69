//! Offer distribution diagnostics: per-round mean and spread of A's share.

use anyhow::Result;
use bargain_core::rng::source_for;
use bargain_core::{OfferGenerator, RandomSampler, SessionConfig};

use crate::config::Settings;
use crate::terminal_output::{render_table, Column};

#[derive(Debug, Clone, PartialEq)]
pub struct RoundStats {
    pub round: u32,
    pub concentration: f64,
    pub expected_mean: f64,
    pub mean: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
}

pub fn sample_rounds(config: &SessionConfig, seed: Option<u64>, rounds: u32, draws: usize) -> Result<Vec<RoundStats>> {
    let generator = OfferGenerator::new(
        config.policy,
        config.concentration,
        RandomSampler::new(config.max_sampler_iterations),
    );
    let mut src = source_for(seed);
    let draws = draws.max(1);

    let mut stats = Vec::with_capacity(rounds as usize);
    for round in 1..=rounds {
        let proposer = config.policy.proposer_for(round);
        let mut shares = Vec::with_capacity(draws);
        for _ in 0..draws {
            shares.push(generator.draw(src.as_mut(), round, proposer)?.share_a);
        }
        let n = shares.len() as f64;
        let mean = shares.iter().sum::<f64>() / n;
        let variance = shares.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        stats.push(RoundStats {
            round,
            concentration: config.concentration.at(round),
            expected_mean: config.policy.mean_a(proposer),
            mean,
            variance,
            min: shares.iter().copied().fold(f64::INFINITY, f64::min),
            max: shares.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });
    }
    Ok(stats)
}

pub async fn run(settings: Settings, rounds: Option<u32>, draws: usize) -> Result<()> {
    let config = settings.session_config()?;
    let rounds = rounds.unwrap_or(config.max_rounds);
    let stats = sample_rounds(&config, settings.seed(), rounds, draws)?;

    let columns = [
        Column::right("Round"),
        Column::right("Conc"),
        Column::right("E[A]"),
        Column::right("Mean A"),
        Column::right("Var A"),
        Column::right("Min"),
        Column::right("Max"),
    ];
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                s.round.to_string(),
                format!("{:.1}", s.concentration),
                format!("{:.3}", s.expected_mean),
                format!("{:.4}", s.mean),
                format!("{:.5}", s.variance),
                format!("{:.3}", s.min),
                format!("{:.3}", s.max),
            ]
        })
        .collect();

    println!("{:?} variant, {} draws per round\n", settings.variant(), draws.max(1));
    print!("{}", render_table(&columns, &rows));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_shrinks_across_rounds() {
        let stats = sample_rounds(&SessionConfig::fixed_skew(), Some(17), 5, 8_000).unwrap();
        assert_eq!(stats.len(), 5);
        assert!(stats[4].variance < stats[0].variance);
        assert!(stats.iter().all(|s| (s.mean - 0.30).abs() < 0.02));
    }

    #[test]
    fn alternating_means_flip() {
        let stats = sample_rounds(&SessionConfig::alternating(), Some(4), 2, 8_000).unwrap();
        assert!((stats[0].expected_mean - 0.58).abs() < 1e-12);
        assert!((stats[1].expected_mean - 0.42).abs() < 1e-12);
        assert!(stats[0].mean > stats[1].mean);
    }
}
