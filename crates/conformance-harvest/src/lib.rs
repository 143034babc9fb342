#![forbid(unsafe_code)]

pub mod binary_json;
pub mod case;
pub mod classify;
pub mod executor;
pub mod harvest;
pub mod schema;
pub mod session;
pub mod suite;
pub mod text_format;
pub mod wire;
