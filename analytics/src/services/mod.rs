pub mod acquisition;
pub mod csv_source;
pub mod metrics_engine;
pub mod price_source;
pub mod report;

pub use acquisition::*;
pub use csv_source::*;
pub use metrics_engine::*;
pub use price_source::*;
pub use report::*;
