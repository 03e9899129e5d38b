//! Shared domain models and HTTP shapes for PetCare.

pub mod api;
pub mod models;
