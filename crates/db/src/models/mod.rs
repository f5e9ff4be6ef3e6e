//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row, plus the input structs its repository accepts.

pub mod ad;
pub mod ad_result;
pub mod analysis;
pub mod analysis_session;
pub mod recommendation;
pub mod selection;
pub mod subscription;
pub mod user;
