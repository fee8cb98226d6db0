pub mod logging;
pub mod parallel;

pub use logging::init_tracing;
pub use parallel::configure_thread_pool;
