//! Department score aggregation.
//!
//! This module groups student records by department, averages their final
//! scores, and attaches the legend colour used when presenting each
//! department.

pub mod aggregate;
pub mod palette;
pub mod types;
