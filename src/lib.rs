// Library target exists for the integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// harnesses can import types via `kioska::app::*` / `kioska::focus::*`.
// Most code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod a11y;
pub mod app;
pub mod audio;
pub mod config;
pub mod event;
pub mod focus;
pub mod idle;
pub mod order;
pub mod route;
pub mod screens;
pub mod ui;
