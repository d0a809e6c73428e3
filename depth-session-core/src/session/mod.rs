pub mod benchmark;
pub mod cancellation;
pub mod capture_loop;
pub mod lifecycle;
