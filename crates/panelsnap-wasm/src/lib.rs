#![forbid(unsafe_code)]

//! Browser binding for panelsnap.
//!
//! This crate provides [`SnapController`], a `wasm-bindgen`-exported struct
//! that binds `panelsnap_runtime::ScrollController` to the live document
//! through `web-sys`: panels and indicators are DOM elements, the viewport
//! is the window, and time is `performance.now()`.
//!
//! ```js
//! import init, { SnapController, initLogging } from "./pkg/panelsnap_wasm.js";
//!
//! await init();
//! initLogging("info");
//! const snap = new SnapController("#landing", JSON.stringify({ cooldown_ms: 200 }));
//! snap.start();
//! nextButton.onclick = () => snap.goToNextSection();
//! ```

#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{SnapController, init_logging};

// Host core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod host_core;
