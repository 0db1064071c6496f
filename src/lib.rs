#![doc = include_str!("../README.md")]

pub mod data_factory;
pub mod discretisation;
pub mod errors;
pub mod interventions;
pub mod matrix;
pub mod network;
pub mod node;
pub mod probability;
pub mod query;
pub mod trainer;

/// Prelude module for the inference engine.
pub mod prelude {
    pub use crate::{
        data_factory::bind_samples,
        discretisation::{DiscretisationSettings, discretise},
        errors::{InferenceError, NetworkError, ParseError},
        interventions::{do_intervention, reverse_do_intervention},
        matrix::{NA, NamedMatrix},
        network::Network,
        node::Node,
        probability::ProbabilityHandler,
        query::{Parser, QueryExecuter},
        trainer::train,
    };
}
