//! Match outcome prediction from historical results.
//!
//! - Per-team home/away profiles aggregated from a match history
//! - Random-forest classifier over profile features with a held-out
//!   accuracy check
//! - Three-way outcome distributions for new fixtures
//! - CSV ingestion, an axum API and CLI commands around the core

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use error::{ApiError, DataFormatError, PredictorError};
pub use models::{FeatureVector, MatchRecord, Outcome, Prediction, TeamProfile, TrainingReport};
pub use services::{aggregate, Classifier, Forecaster, OutcomePredictor, RandomForest, TeamProfiles};
