pub mod csv_io;
pub mod display;
pub mod encoding;
pub mod export;
pub mod import;
pub mod reconcile;
pub mod revision;
pub mod rows;
pub mod senses;
pub mod sentences;

#[cfg(test)]
pub(crate) mod test_support;
