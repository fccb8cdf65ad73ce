//! External data source clients and lookup orchestration

pub mod inat_client;
pub mod lookup;
pub mod retry;
pub mod xeno_client;

pub use inat_client::InatClient;
pub use xeno_client::XenoCantoClient;
