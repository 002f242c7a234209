use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::{FeatureVector, MatchRecord, Outcome, Prediction, TeamProfile, TrainingReport};
use crate::services::{build_training_set, Classifier, ForestConfig, RandomForest, TeamProfiles};
use crate::utils::{accuracy_score, normalize_probabilities};

/// Fewer rows than this leave the model untrained.
pub const MIN_TRAINING_ROWS: usize = 11;

pub const DEFAULT_SPLIT_SEED: u64 = 42;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

impl Prediction {
    /// Map classifier slots onto home/draw/away. Slots the classifier did not
    /// produce take the fallback constants, after which the vector is
    /// renormalised. `confidence` is the largest resulting probability.
    ///
    /// The constants go in before normalisation, so a filled slot reports its
    /// share of the new total rather than the literal constant: `[0.6, 0.4]`
    /// yields an away win of `0.34 / 1.34`, not `0.34`.
    pub fn from_slots(slots: &[f64]) -> Self {
        let fallback = Prediction::FALLBACK.probabilities();
        let mut probs = Vec::with_capacity(fallback.len());
        let mut filled = false;

        for (i, default) in fallback.iter().enumerate() {
            match slots.get(i) {
                Some(&p) => probs.push(p.max(0.0)),
                None => {
                    probs.push(*default);
                    filled = true;
                }
            }
        }

        if filled {
            probs = normalize_probabilities(probs);
        }

        let confidence = probs.iter().copied().fold(0.0, f64::max);
        Prediction {
            home_win: probs[0],
            draw: probs[1],
            away_win: probs[2],
            confidence,
        }
    }
}

/// Owns the single classifier instance and its trained flag.
///
/// `train` replaces the fitted state wholesale and `predict` only reads it, so
/// hosts sharing a predictor across requests guard it with an `RwLock`.
pub struct OutcomePredictor {
    model: Box<dyn Classifier>,
    is_trained: bool,
    split_seed: u64,
    test_fraction: f64,
    last_report: Option<TrainingReport>,
}

impl OutcomePredictor {
    pub fn new() -> Self {
        Self::with_classifier(Box::new(RandomForest::default()))
    }

    pub fn with_forest(config: ForestConfig) -> Self {
        let mut predictor = Self::with_classifier(Box::new(RandomForest::new(config)));
        predictor.split_seed = config.seed;
        predictor
    }

    pub fn with_classifier(model: Box<dyn Classifier>) -> Self {
        Self {
            model,
            is_trained: false,
            split_seed: DEFAULT_SPLIT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            last_report: None,
        }
    }

    /// Fraction of rows held out for evaluation, clamped to `(0, 1)`.
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction.clamp(0.01, 0.99);
        self
    }

    pub fn is_trained(&self) -> bool {
        self.is_trained
    }

    pub fn last_report(&self) -> Option<&TrainingReport> {
        self.last_report.as_ref()
    }

    /// Train on `history` and return held-out accuracy, or 0.0 when there is
    /// not enough data (check `is_trained` to tell the two apart).
    pub fn train(&mut self, history: &[MatchRecord], profiles: &TeamProfiles) -> f64 {
        self.train_with_report(history, profiles).accuracy
    }

    pub fn train_with_report(
        &mut self,
        history: &[MatchRecord],
        profiles: &TeamProfiles,
    ) -> TrainingReport {
        let (features, labels) = build_training_set(history, profiles);

        let mut label_counts = [0usize; 3];
        for label in &labels {
            label_counts[label.index()] += 1;
        }

        let mut report = TrainingReport {
            accuracy: 0.0,
            trained: false,
            total_rows: features.len(),
            train_rows: 0,
            test_rows: 0,
            label_counts,
        };

        self.is_trained = false;

        if features.len() < MIN_TRAINING_ROWS {
            tracing::warn!(
                "Insufficient training data: {} rows (need at least {})",
                features.len(),
                MIN_TRAINING_ROWS
            );
            self.last_report = Some(report.clone());
            return report;
        }

        let (train_idx, test_idx) = self.split_indices(features.len());
        let x_train: Vec<FeatureVector> = train_idx.iter().map(|&i| features[i]).collect();
        let y_train: Vec<Outcome> = train_idx.iter().map(|&i| labels[i]).collect();

        if let Err(e) = self.model.fit(&x_train, &y_train) {
            tracing::error!("Classifier fit failed: {}", e);
            self.last_report = Some(report.clone());
            return report;
        }

        let y_test: Vec<Outcome> = test_idx.iter().map(|&i| labels[i]).collect();
        let y_pred: Vec<Option<Outcome>> = test_idx
            .iter()
            .map(|&i| self.model.predict(&features[i]))
            .collect();

        report.accuracy = accuracy_score(&y_test, &y_pred);
        report.trained = true;
        report.train_rows = train_idx.len();
        report.test_rows = test_idx.len();
        self.is_trained = true;

        tracing::info!(
            "Trained classifier on {} rows, held-out accuracy {:.3} over {} rows",
            report.train_rows,
            report.accuracy,
            report.test_rows
        );

        self.last_report = Some(report.clone());
        report
    }

    /// Seeded shuffle, then the first `ceil(test_fraction * n)` indices form
    /// the test partition.
    fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.split_seed);
        indices.shuffle(&mut rng);

        let n_test = ((self.test_fraction * n as f64).ceil() as usize).clamp(1, n - 1);
        let train = indices.split_off(n_test);
        (train, indices)
    }

    pub fn predict(&self, home: &TeamProfile, away: &TeamProfile, home_advantage: bool) -> Prediction {
        if !self.is_trained {
            return Prediction::FALLBACK;
        }

        let features = FeatureVector::from_profiles(home, away, home_advantage);
        Prediction::from_slots(&self.model.predict_probabilities(&features))
    }

    /// Resolve both teams through the role defaults and predict.
    pub fn predict_fixture(
        &self,
        profiles: &TeamProfiles,
        home_team: &str,
        away_team: &str,
        home_advantage: bool,
    ) -> Prediction {
        let home = profiles.home_profile(home_team);
        let away = profiles.away_profile(away_team);
        self.predict(&home, &away, home_advantage)
    }
}

impl Default for OutcomePredictor {
    fn default() -> Self {
        Self::new()
    }
}
