//! Module for reading and writing Models and the data files of a model building project
pub mod gpr_parse;
pub mod json;
pub mod project;
