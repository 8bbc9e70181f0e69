//! Offer generation: maps a round (and proposer) to Beta parameters and draws a split.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rng::UniformSource;
use crate::sampler::RandomSampler;
use crate::types::{Offer, Proposer};

/// Floor applied to Beta shapes before sampling.
pub const MIN_SHAPE: f64 = 1e-6;

pub const DEFAULT_MEAN_A: f64 = 0.30;
pub const DEFAULT_BIAS: f64 = 0.08;

/// How party A's mean share is chosen each round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferPolicy {
    /// Constant skew; A's mean share never changes.
    FixedSkew { mean_a: f64 },
    /// Proposer alternates by round parity and tilts the mean toward itself.
    AlternatingProposer { bias: f64 },
}

impl OfferPolicy {
    pub fn fixed_skew() -> Self {
        OfferPolicy::FixedSkew {
            mean_a: DEFAULT_MEAN_A,
        }
    }

    pub fn alternating() -> Self {
        OfferPolicy::AlternatingProposer { bias: DEFAULT_BIAS }
    }

    pub fn proposer_for(&self, round: u32) -> Option<Proposer> {
        match self {
            OfferPolicy::FixedSkew { .. } => None,
            OfferPolicy::AlternatingProposer { .. } => Some(Proposer::for_round(round)),
        }
    }

    pub fn mean_a(&self, proposer: Option<Proposer>) -> f64 {
        match *self {
            OfferPolicy::FixedSkew { mean_a } => mean_a,
            OfferPolicy::AlternatingProposer { bias } => match proposer {
                Some(Proposer::A) => 0.5 + bias,
                // B proposes on even rounds; a missing proposer is treated the same way.
                _ => 0.5 - bias,
            },
        }
    }

    pub fn supports_counter(&self) -> bool {
        matches!(self, OfferPolicy::AlternatingProposer { .. })
    }

    /// Concentration schedule each variant uses unless configured otherwise.
    pub fn default_concentration(&self) -> Concentration {
        match self {
            OfferPolicy::FixedSkew { .. } => Concentration::new(16.0, 4.0),
            OfferPolicy::AlternatingProposer { .. } => Concentration::new(14.0, 6.0),
        }
    }
}

/// `conc = base + per_round * round`. Higher means tighter offers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concentration {
    pub base: f64,
    pub per_round: f64,
}

impl Concentration {
    pub fn new(base: f64, per_round: f64) -> Self {
        Self { base, per_round }
    }

    pub fn at(&self, round: u32) -> f64 {
        self.base + self.per_round * round as f64
    }
}

/// Draws offers for a given policy and concentration schedule.
#[derive(Debug, Clone, Copy)]
pub struct OfferGenerator {
    policy: OfferPolicy,
    concentration: Concentration,
    sampler: RandomSampler,
}

impl OfferGenerator {
    pub fn new(policy: OfferPolicy, concentration: Concentration, sampler: RandomSampler) -> Self {
        Self {
            policy,
            concentration,
            sampler,
        }
    }

    pub fn policy(&self) -> &OfferPolicy {
        &self.policy
    }

    pub fn concentration(&self) -> &Concentration {
        &self.concentration
    }

    /// Beta shape parameters for a round, floored at [`MIN_SHAPE`].
    pub fn shapes(&self, round: u32, proposer: Option<Proposer>) -> (f64, f64) {
        let conc = self.concentration.at(round);
        let mean_a = self.policy.mean_a(proposer);
        let alpha = (mean_a * conc).max(MIN_SHAPE);
        let beta = ((1.0 - mean_a) * conc).max(MIN_SHAPE);
        (alpha, beta)
    }

    pub fn draw(
        &self,
        src: &mut dyn UniformSource,
        round: u32,
        proposer: Option<Proposer>,
    ) -> Result<Offer> {
        let (alpha, beta) = self.shapes(round, proposer);
        let share_a = self.sampler.beta(src, alpha, beta)?;
        Ok(Offer::from_share_a(share_a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;

    fn generator(policy: OfferPolicy) -> OfferGenerator {
        OfferGenerator::new(
            policy,
            policy.default_concentration(),
            RandomSampler::default(),
        )
    }

    fn stats(gen: &OfferGenerator, round: u32, n: usize, seed: u64) -> (f64, f64) {
        let mut src = SeededSource::new(seed);
        let proposer = gen.policy().proposer_for(round);
        let draws: Vec<f64> = (0..n)
            .map(|_| gen.draw(&mut src, round, proposer).unwrap().share_a)
            .collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        (mean, var)
    }

    #[test]
    fn offers_sum_to_one() {
        let gen = generator(OfferPolicy::alternating());
        let mut src = SeededSource::new(1);
        for round in 1..=5 {
            for _ in 0..500 {
                let offer = gen.draw(&mut src, round, gen.policy().proposer_for(round)).unwrap();
                assert!((0.0..=1.0).contains(&offer.share_a));
                assert!((0.0..=1.0).contains(&offer.share_b));
                assert!((offer.share_a + offer.share_b - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn fixed_skew_favors_b() {
        let gen = generator(OfferPolicy::fixed_skew());
        let (mean, _) = stats(&gen, 1, 10_000, 11);
        assert!((mean - 0.30).abs() < 0.02, "mean {mean}");
    }

    #[test]
    fn alternating_proposer_favors_itself() {
        let gen = generator(OfferPolicy::alternating());
        let (odd, _) = stats(&gen, 1, 10_000, 5);
        let (even, _) = stats(&gen, 2, 10_000, 6);
        assert!((odd - 0.58).abs() < 0.02, "round 1 mean {odd}");
        assert!((even - 0.42).abs() < 0.02, "round 2 mean {even}");
    }

    #[test]
    fn concentration_grows_and_variance_shrinks() {
        let gen = generator(OfferPolicy::fixed_skew());
        let conc = gen.concentration();
        assert!(conc.at(2) > conc.at(1));

        let (_, v1) = stats(&gen, 1, 20_000, 21);
        let (_, v5) = stats(&gen, 5, 20_000, 21);
        // Beta variance is m(1-m)/(conc+1): 0.21/21 vs 0.21/37.
        assert!(v5 < v1, "variance should shrink: {v1} -> {v5}");
    }

    #[test]
    fn shapes_are_floored() {
        let gen = OfferGenerator::new(
            OfferPolicy::FixedSkew { mean_a: 0.0 },
            Concentration::new(16.0, 4.0),
            RandomSampler::default(),
        );
        let (alpha, beta) = gen.shapes(1, None);
        assert_eq!(alpha, MIN_SHAPE);
        assert_eq!(beta, 20.0);
    }

    #[test]
    fn fixed_skew_has_no_proposer() {
        assert_eq!(OfferPolicy::fixed_skew().proposer_for(3), None);
        assert_eq!(
            OfferPolicy::alternating().proposer_for(4),
            Some(Proposer::B)
        );
    }
}
