pub mod controller;
pub mod persistence;
pub mod session;
pub mod transport;
pub mod ui;
