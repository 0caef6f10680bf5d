pub mod draw;
pub mod gui;
pub mod logging;
pub mod recognize;
pub mod session;
pub mod settings;
