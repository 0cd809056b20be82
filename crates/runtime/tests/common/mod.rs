pub mod fixtures;
pub mod mock_store;

#[allow(unused_imports)]
pub use fixtures::{built_output, scenario_config};
#[allow(unused_imports)]
pub use mock_store::CountingStore;
