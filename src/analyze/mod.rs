pub mod risk_classifier;

pub use risk_classifier::RiskClassifier;
