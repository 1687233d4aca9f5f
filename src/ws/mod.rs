pub mod bootstrap;
pub mod events;
pub mod handler;
pub mod rooms;
