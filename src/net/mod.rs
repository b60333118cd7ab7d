pub mod input;
pub mod manager;
pub mod registry;
pub mod session;
pub mod transport;
