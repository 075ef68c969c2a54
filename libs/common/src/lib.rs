pub mod clock;
pub mod restock;

pub use clock::{countdown, next_aligned, Clock, RESTOCKED};
pub use restock::RestockTimers;
