pub mod diagram;
pub mod logging;
