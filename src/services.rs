mod interface;
mod provider;
mod service;

pub use interface::*;
pub use provider::*;
pub use service::*;
