// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the interactive client.
//
// Module responsibilities:
// - `config`: Backend origin and other start-up settings.
// - `api`: Encapsulates HTTP interactions with the concierge backend
//   (ask, weather, upload, health probe) and the fallback texts.
// - `controller`: Interaction state, the mode-to-query transform and the
//   ask/upload flows as pure transitions plus an effect runner.
// - `ui`: Terminal menu that feeds user input into the controller.
pub mod api;
pub mod config;
pub mod controller;
pub mod ui;
