pub mod booking;
pub mod cinema;
pub mod show;

pub use booking::*;
pub use cinema::*;
pub use show::*;
