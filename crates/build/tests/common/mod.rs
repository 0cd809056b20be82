pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{scenario_catalog, scenario_config, scenario_source};
