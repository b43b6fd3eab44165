pub mod health;
pub mod scan;

pub use health::health_handler;
pub use scan::scan_handler;
