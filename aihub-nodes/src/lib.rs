mod registry;

pub mod node_type;
pub mod error;
pub mod transport;
pub mod credentials;
pub mod catalog;
pub mod model;
pub mod aihub;
pub mod lm_chat;

pub use registry::*;
pub use node_type::*;
pub use error::HubError;

pub mod registry_helper;
pub use registry_helper::register_all_nodes;

#[cfg(test)]
mod test_support;
