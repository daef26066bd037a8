//! HTTP adapter for the remote risk model.

mod http_predictor;

pub use http_predictor::HttpRiskPredictor;
