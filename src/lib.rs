pub mod catalog;
pub mod config_parser;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod payment;
pub mod settings;

pub use catalog::*;
pub use config_parser::*;
pub use domain::*;
pub use error::*;
pub use metrics::*;
pub use observer::*;
pub use payment::*;
pub use settings::*;
