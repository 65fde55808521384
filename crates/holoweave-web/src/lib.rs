#![cfg(target_arch = "wasm32")]
//! Browser boundary: the host owns the canvas and calls into [`EngineHandle`] once per frame.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, ensure};
use holoweave_core::{
    Engine, EngineConfig, EngineRng, ExternalSource, FrameScheduler, MarksMode, MovementMode,
    PreviewHook, TextSource, Theme,
};
use holoweave_render::compose_frame;
use js_sys::{Function, Reflect, Uint8Array};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
struct InitOptions {
    seed: Option<String>,
    movement: Option<String>,
    marks: Option<String>,
    text: Option<String>,
    theme: Option<String>,
    palette: Option<String>,
    width: u32,
    height: u32,
    stamps_per_tick: Option<u32>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            seed: None,
            movement: None,
            marks: None,
            text: None,
            theme: None,
            palette: None,
            width: 1280,
            height: 720,
            stamps_per_tick: None,
        }
    }
}

impl InitOptions {
    fn into_config(self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.movement = self.movement.as_deref().map(MovementMode::from_slug).unwrap_or_default();
        config.marks = self.marks.as_deref().map(MarksMode::from_slug).unwrap_or_default();
        config.text_source = self.text.as_deref().map(TextSource::from_slug).unwrap_or_default();
        config.theme = self.theme.as_deref().map(Theme::from_slug).unwrap_or_default();
        config.palette = self.palette;
        if let Some(stamps) = self.stamps_per_tick {
            config.stamps_per_tick = stamps;
        }
        config
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    seed: String,
    palette: &'static str,
    palette_name: &'static str,
    accent: String,
    movement: MovementMode,
    movement_label: &'static str,
    marks: MarksMode,
    text: TextSource,
    theme: Theme,
    frame: u64,
    paused: bool,
    width: u32,
    height: u32,
    cell: u32,
    external_rng: bool,
}

struct Session {
    engine: Engine,
    scheduler: FrameScheduler,
    preview: Option<PreviewHook>,
    seconds: f64,
}

impl Session {
    fn status(&self) -> Status {
        let engine = &self.engine;
        let config = engine.config();
        let geometry = engine.geometry();
        Status {
            seed: config.seed.clone(),
            palette: engine.palette().slug(),
            palette_name: engine.palette().name(),
            accent: engine.palette().accent_color().to_hex_string(),
            movement: config.movement,
            movement_label: config.movement.label(),
            marks: config.marks,
            text: config.text_source,
            theme: config.theme,
            frame: engine.frame().0,
            paused: self.scheduler.is_paused(),
            width: geometry.width,
            height: geometry.height,
            cell: geometry.cell,
            external_rng: engine.uses_external_rng(),
        }
    }
}

#[wasm_bindgen]
pub struct EngineHandle {
    inner: Rc<RefCell<Session>>,
}

#[wasm_bindgen]
impl EngineHandle {
    /// Build from an options object. `rng` (a zero-argument function returning
    /// a float in `[0, 1)`) and `preview` (the mint capture callback) are optional.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<EngineHandle, JsValue> {
        let (init, rng, preview) = if options.is_null() || options.is_undefined() {
            (InitOptions::default(), None, None)
        } else {
            (
                from_value::<InitOptions>(options.clone()).map_err(js_error)?,
                function_field(&options, "rng")?,
                function_field(&options, "preview")?,
            )
        };
        let (width, height) = (init.width, init.height);
        let config = init.into_config();

        let engine = match rng {
            Some(func) => {
                validate_rng(&func).map_err(js_error)?;
                let source = ExternalSource::new(move || {
                    func.call0(&JsValue::NULL)
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(0.0)
                });
                Engine::with_rng(config, width, height, EngineRng::from_source(source))
            }
            None => Engine::new(config, width, height),
        }
        .map_err(js_error)?;

        let preview = preview.map(|func| {
            PreviewHook::new(move || {
                let _ = func.call0(&JsValue::NULL);
            })
        });

        Ok(EngineHandle {
            inner: Rc::new(RefCell::new(Session {
                engine,
                scheduler: FrameScheduler::new(),
                preview,
                seconds: 0.0,
            })),
        })
    }

    /// Run one tick for the animation callback at `now_ms`. Returns `false` while paused.
    pub fn frame(&self, now_ms: f64) -> bool {
        let mut guard = self.inner.borrow_mut();
        let session = &mut *guard;
        match session.scheduler.frame(&mut session.engine, now_ms) {
            Some(frame) => {
                session.seconds = frame.seconds;
                true
            }
            None => false,
        }
    }

    /// Copy of the buffer, `width * height * 4` RGBA bytes.
    pub fn pixels(&self) -> Uint8Array {
        let session = self.inner.borrow();
        Uint8Array::from(session.engine.buffer().data())
    }

    pub fn width(&self) -> u32 {
        self.inner.borrow().engine.buffer().width()
    }

    pub fn height(&self) -> u32 {
        self.inner.borrow().engine.buffer().height()
    }

    pub fn pause(&self) {
        self.inner.borrow_mut().scheduler.pause();
    }

    pub fn resume(&self, now_ms: f64) {
        self.inner.borrow_mut().scheduler.resume(now_ms);
    }

    /// Returns `true` when the handle is now paused.
    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&self, now_ms: f64) -> bool {
        self.inner.borrow_mut().scheduler.toggle(now_ms)
    }

    /// Capture the mint preview for the current seed, at most once per seed.
    pub fn mint(&self) -> bool {
        let mut session = self.inner.borrow_mut();
        let seed = session.engine.seed().to_owned();
        session
            .preview
            .as_mut()
            .is_some_and(|hook| hook.mint(&seed))
    }

    /// Start over from `seed`, or from a fresh seed drawn from the stream.
    /// Returns the seed now in use.
    pub fn reseed(&self, seed: Option<String>) -> Result<String, JsValue> {
        let mut session = self.inner.borrow_mut();
        match seed {
            Some(seed) => {
                session.engine.reseed(&seed).map_err(js_error)?;
                Ok(seed)
            }
            None => session.engine.reseed_next().map_err(js_error),
        }
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .engine
            .resize(width, height)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = cycleMovement)]
    pub fn cycle_movement(&self) -> String {
        self.inner.borrow_mut().engine.cycle_movement().to_string()
    }

    #[wasm_bindgen(js_name = cycleMarks)]
    pub fn cycle_marks(&self) -> String {
        self.inner.borrow_mut().engine.cycle_marks().to_string()
    }

    #[wasm_bindgen(js_name = cycleText)]
    pub fn cycle_text(&self) -> String {
        self.inner.borrow_mut().engine.cycle_text().to_string()
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> String {
        self.inner.borrow_mut().engine.toggle_theme().to_string()
    }

    /// Full composed frame (upscale plus sheen) at `width x height`; simulation state is untouched.
    #[wasm_bindgen(js_name = exportRgba)]
    pub fn export_rgba(&self, width: u32, height: u32, now_ms: f64) -> Result<Uint8Array, JsValue> {
        let session = self.inner.borrow();
        let rgba = compose_frame(&session.engine.render_target(), width, height, now_ms / 1000.0)
            .map_err(js_error)?;
        Ok(Uint8Array::from(rgba.as_slice()))
    }

    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_value(&self.inner.borrow().status()).map_err(js_error)
    }

    /// Wall-clock seconds of the last ticked frame.
    #[wasm_bindgen(js_name = lastSeconds)]
    pub fn last_seconds(&self) -> f64 {
        self.inner.borrow().seconds
    }
}

/// Optional function-valued field of the options object.
fn function_field(options: &JsValue, name: &str) -> Result<Option<Function>, JsValue> {
    let value = Reflect::get(options, &JsValue::from_str(name))?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    value
        .dyn_into::<Function>()
        .map(Some)
        .map_err(|_| js_error(format!("option `{name}` must be a function")))
}

/// Probe an external stream once so per-draw calls never need error handling.
fn validate_rng(func: &Function) -> Result<()> {
    for _ in 0..4 {
        let value = func
            .call0(&JsValue::NULL)
            .map_err(|_| anyhow::anyhow!("rng function threw"))?
            .as_f64();
        let Some(value) = value else {
            anyhow::bail!("rng function must return a number");
        };
        ensure!(
            (0.0..1.0).contains(&value),
            "rng function must return values in [0, 1), got {value}"
        );
    }
    Ok(())
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

#[wasm_bindgen]
pub fn version() -> String {
    format!("holoweave-web {}", env!("CARGO_PKG_VERSION"))
}

#[wasm_bindgen(js_name = defaultInitOptions)]
pub fn default_init_options() -> Result<JsValue, JsValue> {
    to_value(&InitOptions::default()).map_err(js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn handle_matches_native_engine() {
        let options = to_value(&InitOptions {
            seed: Some("wasm".to_owned()),
            width: 320,
            height: 240,
            ..InitOptions::default()
        })
        .expect("options");
        let handle = EngineHandle::new(options).expect("handle");
        let mut native = Engine::new(EngineConfig::seeded("wasm"), 320, 240).expect("engine");
        for i in 0..10 {
            assert!(handle.frame(f64::from(i) * 16.0));
            native.tick();
        }
        assert_eq!(handle.pixels().to_vec(), native.buffer().data());
    }

    #[wasm_bindgen_test]
    fn paused_handle_does_not_tick() {
        let handle = EngineHandle::new(JsValue::UNDEFINED).expect("handle");
        assert!(handle.toggle_pause(0.0));
        assert!(!handle.frame(16.0));
        assert!(!handle.toggle_pause(32.0));
        assert!(handle.frame(48.0));
    }
}
