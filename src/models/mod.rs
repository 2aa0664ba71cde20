pub mod gpu;
pub mod history;
pub mod snapshot;
