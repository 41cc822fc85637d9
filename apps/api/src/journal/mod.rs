pub mod handlers;
pub mod lifecycle;

pub use lifecycle::Journal;
