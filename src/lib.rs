// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds argument parsing and the terminal.
pub mod app;
pub mod app_dirs;
pub mod codec;
pub mod fair_pick;
pub mod form;
pub mod logging;
pub mod question;
pub mod rng;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod store;
pub mod ui;

pub use app::App;
