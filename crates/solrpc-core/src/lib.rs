pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::RpcConfig;
pub use error::{ConfigError, Error};
pub use traits::RpcTransport;
pub use types::{HttpMethod, RpcRequest};
