pub mod callback_controller;

pub use callback_controller::configure;
