pub mod components;
pub mod error;
pub mod events;
pub mod evolution;
pub mod history;
pub mod parts;
pub mod session;
pub mod stats;
pub mod sword;
