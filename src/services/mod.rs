//! Servicios externos

pub mod payment_provider;
