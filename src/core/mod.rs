//! Plot construction: corpus parsing, graph queries, recommendation,
//! selection and draft composition.

pub mod composer;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod graph;
pub mod recommend;
pub mod resolver;
pub mod selector;
