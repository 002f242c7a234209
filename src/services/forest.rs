use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PredictorError;
use crate::models::{FeatureVector, Outcome};

const N_CLASSES: usize = Outcome::ALL.len();

/// Multi-class model behind the outcome predictor.
///
/// `predict_probabilities` returns one slot per label index up to the highest
/// label seen during `fit`, so a model that never saw `AwayWin` yields two
/// slots.
pub trait Classifier: Send + Sync {
    /// Fit from scratch, discarding any previous state.
    fn fit(&mut self, features: &[FeatureVector], labels: &[Outcome]) -> Result<(), PredictorError>;

    fn predict_probabilities(&self, features: &FeatureVector) -> Vec<f64>;

    /// Highest-probability class; ties go to the lower label.
    fn predict(&self, features: &FeatureVector) -> Option<Outcome> {
        let probs = self.predict_probabilities(features);
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in probs.iter().copied().enumerate() {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }
        best.and_then(|(i, _)| Outcome::from_index(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split.
    pub max_features: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: (FeatureVector::LEN as f64).sqrt().floor().max(1.0) as usize,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        distribution: [f64; N_CLASSES],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn class_counts(labels: &[Outcome], samples: &[usize]) -> [usize; N_CLASSES] {
    let mut counts = [0; N_CLASSES];
    for &i in samples {
        counts[labels[i].index()] += 1;
    }
    counts
}

fn gini(counts: &[usize; N_CLASSES], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// CART tree using Gini impurity, grown on a bootstrap sample.
#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn grow(
        config: &ForestConfig,
        features: &[FeatureVector],
        labels: &[Outcome],
        samples: Vec<usize>,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = DecisionTree { nodes: Vec::new() };
        tree.build(config, features, labels, samples, 0, rng);
        tree
    }

    fn build(
        &mut self,
        config: &ForestConfig,
        features: &[FeatureVector],
        labels: &[Outcome],
        samples: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let counts = class_counts(labels, &samples);
        let depth_reached = config.max_depth.is_some_and(|max| depth >= max);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        let split = if depth_reached || pure || samples.len() < config.min_samples_split {
            None
        } else {
            Self::best_split(config, features, labels, &samples, &counts, rng)
        };

        let Some(split) = split else {
            let total = samples.len().max(1) as f64;
            let mut distribution = [0.0; N_CLASSES];
            for (slot, &c) in distribution.iter_mut().zip(counts.iter()) {
                *slot = c as f64 / total;
            }
            self.nodes.push(Node::Leaf { distribution });
            return self.nodes.len() - 1;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| features[i].get(split.feature) <= split.threshold);

        // Reserve the slot so the parent precedes its children.
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: [0.0; N_CLASSES],
        });
        let left = self.build(config, features, labels, left_samples, depth + 1, rng);
        let right = self.build(config, features, labels, right_samples, depth + 1, rng);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn best_split(
        config: &ForestConfig,
        features: &[FeatureVector],
        labels: &[Outcome],
        samples: &[usize],
        parent_counts: &[usize; N_CLASSES],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..FeatureVector::LEN).collect();
        order.shuffle(rng);

        let n = samples.len();
        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;

        for feature in order {
            if visited >= config.max_features {
                break;
            }

            let mut sorted = samples.to_vec();
            sorted.sort_by(|&a, &b| features[a].get(feature).total_cmp(&features[b].get(feature)));

            let first = features[sorted[0]].get(feature);
            let last = features[sorted[n - 1]].get(feature);
            if first == last {
                // constant within this node, does not count towards max_features
                continue;
            }
            visited += 1;

            let mut left = [0usize; N_CLASSES];
            let mut right = *parent_counts;
            for pos in 1..n {
                let moved = labels[sorted[pos - 1]].index();
                left[moved] += 1;
                right[moved] -= 1;

                let lo = features[sorted[pos - 1]].get(feature);
                let hi = features[sorted[pos]].get(feature);
                if lo == hi {
                    continue;
                }

                let impurity = (pos as f64 * gini(&left, pos)
                    + (n - pos) as f64 * gini(&right, n - pos))
                    / n as f64;
                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: lo + (hi - lo) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best
    }

    fn leaf_distribution(&self, features: &FeatureVector) -> [f64; N_CLASSES] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution } => return *distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Bagged ensemble of CART trees with per-split feature subsampling.
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_slots: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_slots: 0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &[FeatureVector], labels: &[Outcome]) -> Result<(), PredictorError> {
        if features.len() != labels.len() {
            return Err(PredictorError::LengthMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }
        if features.is_empty() {
            return Err(PredictorError::EmptyTrainingSet);
        }

        self.trees.clear();
        self.n_slots = 0;

        let n = features.len();
        let draw = Uniform::new(0, n).map_err(|e| PredictorError::Sampling(e.to_string()))?;
        let mut trees = Vec::with_capacity(self.config.n_estimators);

        for t in 0..self.config.n_estimators.max(1) {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> = (0..n).map(|_| draw.sample(&mut rng)).collect();
            trees.push(DecisionTree::grow(&self.config, features, labels, bootstrap, &mut rng));
        }

        self.trees = trees;
        self.n_slots = labels.iter().map(|l| l.index()).max().map_or(0, |m| m + 1);
        Ok(())
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> Vec<f64> {
        if !self.is_fitted() {
            return Vec::new();
        }

        let mut sums = [0.0; N_CLASSES];
        for tree in &self.trees {
            let leaf = tree.leaf_distribution(features);
            for (sum, p) in sums.iter_mut().zip(leaf.iter()) {
                *sum += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        sums.iter()
            .take(self.n_slots)
            .map(|s| s / n_trees)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(a: f64, b: f64) -> FeatureVector {
        FeatureVector([a, b, 1.0, 1.0, 1.0])
    }

    fn separable() -> (Vec<FeatureVector>, Vec<Outcome>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let v = i as f64 / 30.0;
            x.push(fv(v, 1.0 - v));
            y.push(if v < 0.33 {
                Outcome::AwayWin
            } else if v < 0.66 {
                Outcome::Draw
            } else {
                Outcome::HomeWin
            });
        }
        (x, y)
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let mut forest = RandomForest::default();
        assert!(matches!(
            forest.fit(&[], &[]),
            Err(PredictorError::EmptyTrainingSet)
        ));
        assert!(matches!(
            forest.fit(&[fv(0.0, 0.0)], &[]),
            Err(PredictorError::LengthMismatch { .. })
        ));
        assert!(!forest.is_fitted());
    }

    #[test]
    fn test_probabilities_are_distribution() {
        let (x, y) = separable();
        let mut forest = RandomForest::default();
        forest.fit(&x, &y).unwrap();

        for sample in &x {
            let probs = forest.predict_probabilities(sample);
            assert_eq!(probs.len(), 3);
            assert!(probs.iter().all(|&p| p >= 0.0));
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_learns_separable_classes() {
        let (x, y) = separable();
        let mut forest = RandomForest::default();
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.predict(&fv(0.05, 0.95)), Some(Outcome::AwayWin));
        assert_eq!(forest.predict(&fv(0.5, 0.5)), Some(Outcome::Draw));
        assert_eq!(forest.predict(&fv(0.95, 0.05)), Some(Outcome::HomeWin));
    }

    #[test]
    fn test_slots_follow_highest_seen_label() {
        let x = vec![fv(0.1, 0.1), fv(0.9, 0.9), fv(0.2, 0.2), fv(0.8, 0.8)];
        let y = vec![Outcome::HomeWin, Outcome::Draw, Outcome::HomeWin, Outcome::Draw];
        let mut forest = RandomForest::default();
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.predict_probabilities(&fv(0.5, 0.5)).len(), 2);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = separable();
        let mut a = RandomForest::default();
        let mut b = RandomForest::default();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let input = fv(0.4, 0.3);
        assert_eq!(a.predict_probabilities(&input), b.predict_probabilities(&input));
    }

    #[test]
    fn test_unfitted_forest_has_no_slots() {
        assert!(RandomForest::default()
            .predict_probabilities(&fv(0.0, 0.0))
            .is_empty());
    }
}
