//! Domain layer - Core carving logic
//!
//! This module contains the domain entities, the collaborator traits the
//! core depends on, and the carving services. It performs no I/O itself.

pub mod entities;
pub mod repositories;
pub mod services;
