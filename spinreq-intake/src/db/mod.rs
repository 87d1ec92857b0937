//! Rule store and request persistence

pub mod requests;
pub mod rules;
pub mod settings;
