pub mod aggregator;
pub mod features;
pub mod forecaster;
pub mod forest;
pub mod predictor;

pub use aggregator::*;
pub use features::*;
pub use forecaster::*;
pub use forest::*;
pub use predictor::*;
