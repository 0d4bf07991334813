//! Pure data types and algorithms: no I/O, no logging side effects.

pub mod call_vector;
pub mod cluster;
pub mod code_unit;
pub mod dep_context;
pub mod finding;
pub mod fingerprint;
pub mod scored_pair;
pub mod similarity;
pub mod sparse_vector;
pub mod type_signature;
pub mod weights;
