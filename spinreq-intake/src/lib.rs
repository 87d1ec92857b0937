//! # SpinReq Intake Library (spinreq-intake)
//!
//! Request intake microservice for crowd-sourced song requests.
//!
//! **Purpose:** Evaluate submitted song requests against an organization's
//! rule set (blacklist, pricing overrides, library boundary, duplicate
//! detection), produce an admission decision with a final price, persist
//! accepted requests, and expose an HTTP control interface plus thin admin
//! CRUD over the rule store.
//!
//! The decision core lives in [`policy`] and is a pure function; everything
//! else is plumbing around it.

pub mod api;
pub mod db;
pub mod error;
pub mod policy;
pub mod pricing;

pub use error::{Error, Result};
