//! WASM exports for the presentation.
//!
//! The page calls `cabin_init` once with its config, then `cabin_begin_frame`,
//! any host inputs, and `cabin_tick` from every `requestAnimationFrame`. Output
//! is read through the pointer exports into WASM memory; see
//! `cabin_engine::bridge::protocol` for the layout.

pub mod runner;

pub use runner::PresentationRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<PresentationRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. Before `cabin_init` this logs and returns the
/// default value instead.
fn with_runner<R: Default>(f: impl FnOnce(&mut PresentationRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            log::warn!("presentation not initialized; call cabin_init() first");
            R::default()
        }
    })
}

#[wasm_bindgen]
pub fn cabin_init(config_json: &str, viewport_width: f32, viewport_height: f32) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let mut runner = PresentationRunner::from_json(config_json, viewport_width, viewport_height)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    runner.start();
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("cabin: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn cabin_begin_frame() {
    with_runner(|r| r.begin_frame());
}

#[wasm_bindgen]
pub fn cabin_tick(dt_ms: f64) {
    with_runner(|r| r.tick(dt_ms));
}

// ---- Host inputs ----

#[wasm_bindgen]
pub fn cabin_victory() {
    with_runner(|r| r.victory());
}

#[wasm_bindgen]
pub fn cabin_signal(name: &str) -> bool {
    with_runner(|r| r.signal(name))
}

#[wasm_bindgen]
pub fn cabin_set_scene_rect(x: f32, y: f32, width: f32, height: f32) {
    with_runner(|r| r.set_scene_rect(x, y, width, height));
}

#[wasm_bindgen]
pub fn cabin_set_viewport(width: f32, height: f32) {
    with_runner(|r| r.set_viewport(width, height));
}

#[wasm_bindgen]
pub fn cabin_audio_blocked(cue: u32) {
    with_runner(|r| r.audio_blocked(cue));
}

#[wasm_bindgen]
pub fn cabin_audio_unavailable(cue: u32) {
    with_runner(|r| r.audio_unavailable(cue));
}

#[wasm_bindgen]
pub fn cabin_audio_allowed(cue: u32) {
    with_runner(|r| r.audio_allowed(cue));
}

#[wasm_bindgen]
pub fn cabin_gameplay_ready(ready: bool) {
    with_runner(|r| r.gameplay_ready(ready));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_header_ptr() -> *const f32 {
    with_runner(|r| r.header_ptr() as usize) as *const f32
}

#[wasm_bindgen]
pub fn get_commands_ptr() -> *const f32 {
    with_runner(|r| r.commands_ptr() as usize) as *const f32
}

#[wasm_bindgen]
pub fn get_command_count() -> u32 {
    with_runner(|r| r.command_count())
}

#[wasm_bindgen]
pub fn get_caption_text(slot: u32) -> Option<String> {
    with_runner(|r| r.caption_text(slot))
}

#[wasm_bindgen]
pub fn get_signals_ptr() -> *const u32 {
    with_runner(|r| r.signals_ptr() as usize) as *const u32
}

#[wasm_bindgen]
pub fn get_signals_len() -> u32 {
    with_runner(|r| r.signals_len())
}

#[wasm_bindgen]
pub fn get_phase() -> u32 {
    with_runner(|r| r.phase().code())
}

#[wasm_bindgen]
pub fn get_prologue_complete() -> bool {
    with_runner(|r| r.prologue_complete())
}
