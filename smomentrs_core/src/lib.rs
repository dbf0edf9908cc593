//! Core rust implementation of sMOMENT.rs, a crate for building protein-constrained (sMOMENT and
//! GECKO) metabolic models from a stoichiometric model, enzyme kinetics and protein data.

pub mod analysis;
pub mod cache;
pub mod configuration;
pub mod enhance;
pub mod gene_rule;
pub mod io;
pub mod kcat;
pub mod metabolic_model;
pub mod optimize;
