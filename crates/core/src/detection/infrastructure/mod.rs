pub mod cascade_classifier;
pub mod detector_factory;
pub mod model_resolver;
