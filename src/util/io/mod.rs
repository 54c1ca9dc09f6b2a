pub mod bus;
pub mod mqtt;
pub mod payload;
pub mod serial;
pub mod transport;
