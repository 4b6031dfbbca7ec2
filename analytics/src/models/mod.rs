pub mod date_range;
pub mod metrics;
pub mod price_series;
pub mod run;

pub use date_range::*;
pub use metrics::*;
pub use price_series::*;
pub use run::*;
