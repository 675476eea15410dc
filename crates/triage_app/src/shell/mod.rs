pub mod app;
pub mod effects;
pub mod history;
pub mod logging;
pub mod ui;
