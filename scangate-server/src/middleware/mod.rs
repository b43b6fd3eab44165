pub mod body_limit;

pub use body_limit::enforce_body_limit;
