pub mod fs;
pub mod ids;
pub mod logging;
