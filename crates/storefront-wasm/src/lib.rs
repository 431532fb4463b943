//! WASM bindings for the storefront client core.
//!
//! Exposes credential unwrapping, the `localStorage`-backed auth session, and
//! the attribute form synchronizer to the browser frontend.

pub mod auth;
mod error;
pub mod forms;

use wasm_bindgen::prelude::*;

/// Install the panic hook so Rust panics surface in the browser console.
#[wasm_bindgen(js_name = "init")]
pub fn wasm_init() {
    console_error_panic_hook::set_once();
}
