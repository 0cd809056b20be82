pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{backends, seeded_bytes};
