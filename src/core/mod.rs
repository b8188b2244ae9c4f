pub mod engine;
pub mod explorer;
pub mod reachability;
pub mod search;
pub mod session;
