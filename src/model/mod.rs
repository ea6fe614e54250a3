pub mod dataset;
pub mod revision;
pub mod sense;
pub mod sentence;

pub type Id = u64;
