#![forbid(unsafe_code)]

//! `wasm-bindgen` exports and the live DOM backend.
//!
//! This module wraps [`super::host_core::HostCore`] with `web-sys` types.
//! Only compiled on `wasm32` targets.

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, EventTarget, KeyboardEvent, NodeList,
    ScrollToOptions, Window,
};
use web_time::Instant;

use panelsnap_backend::{
    Backend, BackendClock, IndicatorSet, PanelSurface, ScrollBehavior, Viewport,
};
use panelsnap_core::{
    AnimationVocabulary, HostEnvironment, InitializationError, MarkupConfig, PanelFlags,
};
use panelsnap_runtime::{EventDispatch, InitOutcome, LOG_TARGET, TransitionOutcome};

use super::host_core::{DomInput, DomListener, HostCore, ListenerTarget, log_level, parse_config};
use super::logging;

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// DOM backend error: a stringified `JsValue` or a missing global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError(String);

impl DomError {
    fn unavailable(what: &str) -> Self {
        Self(format!("{what} unavailable"))
    }

    fn no_such(what: &str, index: usize) -> Self {
        Self(format!("no {what} at index {index}"))
    }
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl core::fmt::Display for DomError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DomError {}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

// ---------------------------------------------------------------------------
// DOM backend
// ---------------------------------------------------------------------------

pub struct DomClock {
    origin: Instant,
}

impl BackendClock for DomClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub struct DomPanels {
    window: Option<Window>,
    scope: Option<Element>,
    markup: MarkupConfig,
    items: Vec<Element>,
}

impl DomPanels {
    fn panel(&self, index: usize) -> Result<&Element, DomError> {
        self.items
            .get(index)
            .ok_or_else(|| DomError::no_such("panel", index))
    }

    fn animated(&self, index: usize) -> Result<Vec<Element>, DomError> {
        let panel = self.panel(index)?;
        Ok(elements(
            &panel.query_selector_all(&self.markup.animated_selector)?,
        ))
    }
}

impl PanelSurface for DomPanels {
    type Error = DomError;

    fn discover(&mut self) -> Result<usize, Self::Error> {
        let scope = self
            .scope
            .as_ref()
            .ok_or_else(|| DomError::unavailable("panel container"))?;
        self.items = elements(&scope.query_selector_all(&self.markup.panel_selector)?);
        Ok(self.items.len())
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn set_flags(&mut self, index: usize, flags: PanelFlags) -> Result<(), Self::Error> {
        let classes = self.panel(index)?.class_list();
        classes.toggle_with_force(&self.markup.active_class, flags.contains(PanelFlags::ACTIVE))?;
        classes.toggle_with_force(
            &self.markup.animate_class,
            flags.contains(PanelFlags::ANIMATE),
        )?;
        Ok(())
    }

    fn clear_animations(
        &mut self,
        index: usize,
        vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error> {
        let animated = self.animated(index)?;
        for element in &animated {
            let classes = element.class_list();
            for class in vocabulary.classes() {
                classes.remove_1(class)?;
            }
        }
        Ok(animated.len())
    }

    fn trigger_entrance(
        &mut self,
        index: usize,
        vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error> {
        let mut count = 0;
        for element in self.animated(index)? {
            let Some(effect) = element.get_attribute(&self.markup.animation_attribute) else {
                continue;
            };
            if let Some([base, effect]) = vocabulary.entrance_classes(&effect) {
                element.class_list().add_2(base, effect)?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn document_top(&self, index: usize) -> Result<f64, Self::Error> {
        let window = self
            .window
            .as_ref()
            .ok_or_else(|| DomError::unavailable("window"))?;
        let rect = self.panel(index)?.get_bounding_client_rect();
        Ok(rect.top() + window.scroll_y()?)
    }
}

pub struct DomViewport {
    window: Option<Window>,
}

impl Viewport for DomViewport {
    type Error = DomError;

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> Result<(), Self::Error> {
        let window = self
            .window
            .as_ref()
            .ok_or_else(|| DomError::unavailable("window"))?;
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        window.scroll_to_with_scroll_to_options(&options);
        Ok(())
    }

    fn scroll_offset(&self) -> f64 {
        self.window
            .as_ref()
            .and_then(|w| w.scroll_y().ok())
            .unwrap_or(0.0)
    }
}

pub struct DomIndicators {
    document: Option<Document>,
    selector: String,
    active_class: String,
    items: Vec<Element>,
}

impl IndicatorSet for DomIndicators {
    type Error = DomError;

    fn discover(&mut self) -> Result<usize, Self::Error> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| DomError::unavailable("document"))?;
        self.items = elements(&document.query_selector_all(&self.selector)?);
        Ok(self.items.len())
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn set_active(&mut self, index: usize, active: bool) -> Result<(), Self::Error> {
        let item = self
            .items
            .get(index)
            .ok_or_else(|| DomError::no_such("indicator", index))?;
        item.class_list()
            .toggle_with_force(&self.active_class, active)?;
        Ok(())
    }
}

/// Backend bound to the live document.
pub struct DomBackend {
    environment: HostEnvironment,
    clock: DomClock,
    panels: DomPanels,
    viewport: DomViewport,
    indicators: DomIndicators,
}

impl DomBackend {
    /// Bind to the current document. Panels are searched inside the first
    /// element matching `container_selector`, or the whole document.
    fn new(container_selector: Option<&str>, markup: &MarkupConfig) -> Self {
        let window = web_sys::window();
        let document = window.as_ref().and_then(Window::document);
        let scope = document.as_ref().and_then(|doc| match container_selector {
            Some(selector) => doc.query_selector(selector).ok().flatten(),
            None => doc.document_element(),
        });
        let environment = if document.is_some() {
            HostEnvironment::Browser
        } else {
            HostEnvironment::NonInteractive
        };
        Self {
            environment,
            clock: DomClock {
                origin: Instant::now(),
            },
            panels: DomPanels {
                window: window.clone(),
                scope,
                markup: markup.clone(),
                items: Vec::new(),
            },
            viewport: DomViewport { window },
            indicators: DomIndicators {
                document,
                selector: markup.indicator_selector.clone(),
                active_class: markup.active_class.clone(),
                items: Vec::new(),
            },
        }
    }
}

impl Backend for DomBackend {
    type Error = DomError;

    type Clock = DomClock;
    type Panels = DomPanels;
    type Viewport = DomViewport;
    type Indicators = DomIndicators;

    fn environment(&self) -> HostEnvironment {
        self.environment
    }

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn panels(&mut self) -> &mut Self::Panels {
        &mut self.panels
    }

    fn viewport(&mut self) -> &mut Self::Viewport {
        &mut self.viewport
    }

    fn indicators(&mut self) -> &mut Self::Indicators {
        &mut self.indicators
    }
}

// ---------------------------------------------------------------------------
// Listeners and timers
// ---------------------------------------------------------------------------

struct Shared {
    host: HostCore<DomBackend>,
    listeners: Option<ListenerSet>,
    setup_timer: Option<i32>,
    settle_timer: Option<i32>,
}

type SharedRef = Rc<RefCell<Shared>>;

/// Installed DOM listeners. Dropping the set removes them all.
struct ListenerSet {
    entries: Vec<(EventTarget, DomListener, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl ListenerSet {
    fn install(shared: &SharedRef) -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::unavailable("window"))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::unavailable("document"))?;
        let mut set = Self {
            entries: Vec::with_capacity(DomListener::ALL.len()),
        };
        for listener in DomListener::ALL {
            let target: EventTarget = match listener.target() {
                ListenerTarget::Window => window.clone().into(),
                ListenerTarget::Document => document.clone().into(),
            };
            let weak = Rc::downgrade(shared);
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
                if let Some(shared) = weak.upgrade() {
                    on_dom_event(&shared, listener, &event);
                }
            });
            let options = AddEventListenerOptions::new();
            options.set_passive(listener.passive());
            // On error `set` drops here and removes what was already added.
            target.add_event_listener_with_callback_and_add_event_listener_options(
                listener.event_type(),
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
            set.entries.push((target, listener, closure));
        }
        Ok(set)
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        for (target, listener, closure) in &self.entries {
            let _ = target.remove_event_listener_with_callback(
                listener.event_type(),
                closure.as_ref().unchecked_ref(),
            );
        }
    }
}

fn dispatch(shared: &SharedRef, input: DomInput<'_>) -> Option<EventDispatch> {
    shared.borrow_mut().host.on_input(input)
}

fn on_dom_event(shared: &SharedRef, listener: DomListener, event: &web_sys::Event) {
    let result = match listener {
        DomListener::Wheel => {
            let Some(wheel) = event.dyn_ref::<web_sys::WheelEvent>() else {
                return;
            };
            dispatch(
                shared,
                DomInput::Wheel {
                    delta_y: wheel.delta_y(),
                    delta_mode: wheel.delta_mode(),
                },
            )
        }
        DomListener::TouchStart
        | DomListener::TouchMove
        | DomListener::TouchEnd
        | DomListener::TouchCancel => {
            let (Some(touch), Some(phase)) = (
                event.dyn_ref::<web_sys::TouchEvent>(),
                listener.touch_phase(),
            ) else {
                return;
            };
            let client_y = touch
                .touches()
                .get(0)
                .or_else(|| touch.changed_touches().get(0))
                .map(|t| f64::from(t.client_y()));
            dispatch(shared, DomInput::Touch { phase, client_y })
        }
        DomListener::KeyDown => {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let name = key.key();
            dispatch(
                shared,
                DomInput::Key {
                    key: &name,
                    repeat: key.repeat(),
                },
            )
        }
        DomListener::ScrollEnd => dispatch(shared, DomInput::ScrollEnd),
    };
    if result.is_some_and(|d| d.prevent_default) {
        event.prevent_default();
    }
    schedule_settle(shared);
}

fn set_timeout(delay: Duration, f: impl FnOnce() + 'static) -> Result<i32, DomError> {
    let window = web_sys::window().ok_or_else(|| DomError::unavailable("window"))?;
    let callback = Closure::once_into_js(f);
    let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    Ok(window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        ms,
    )?)
}

/// Arm the settle timer for the in-flight transition, if one is needed.
fn schedule_settle(shared: &SharedRef) {
    let mut state = shared.borrow_mut();
    if state.settle_timer.is_some() {
        return;
    }
    let Some(delay) = state.host.timer_delay() else {
        return;
    };
    let weak = Rc::downgrade(shared);
    match set_timeout(delay, move || {
        if let Some(shared) = weak.upgrade() {
            on_settle_timer(&shared);
        }
    }) {
        Ok(handle) => state.settle_timer = Some(handle),
        Err(err) => {
            tracing::warn!(target: LOG_TARGET, error = %err, "settle timer not scheduled");
        }
    }
}

fn on_settle_timer(shared: &SharedRef) {
    {
        let mut state = shared.borrow_mut();
        state.settle_timer = None;
        state.host.on_timer();
    }
    // A newer transition may have started after an early settle.
    schedule_settle(shared);
}

fn sync_listeners(shared: &SharedRef) {
    let (attached, installed) = {
        let state = shared.borrow();
        (
            state.host.controller().is_attached(),
            state.listeners.is_some(),
        )
    };
    match (attached, installed) {
        (true, false) => match ListenerSet::install(shared) {
            Ok(set) => shared.borrow_mut().listeners = Some(set),
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, error = %err, "listener installation failed");
                shared.borrow_mut().host.controller_mut().detach();
            }
        },
        (false, true) => {
            let removed = shared.borrow_mut().listeners.take();
            drop(removed);
        }
        _ => {}
    }
}

fn setup(shared: &SharedRef) -> Result<InitOutcome, InitializationError> {
    let result = shared.borrow_mut().host.complete_setup();
    sync_listeners(shared);
    result
}

/// Delayed setup fired. Nobody is waiting on the result, so a failure goes
/// to the console when no subscriber has recorded it.
fn on_setup_timer(shared: &SharedRef) {
    shared.borrow_mut().setup_timer = None;
    if setup(shared).is_ok() {
        return;
    }
    let report = shared
        .borrow()
        .host
        .unlogged_failure(tracing::dispatcher::has_been_set());
    if let Some(message) = report {
        console_error(&message);
    }
}

fn clear_timeout(handle: Option<i32>) {
    if let (Some(handle), Some(window)) = (handle, web_sys::window()) {
        window.clear_timeout_with_handle(handle);
    }
}

fn outcome_to_js(outcome: TransitionOutcome) -> JsValue {
    let obj = Object::new();
    set_js(&obj, "accepted", outcome.is_accepted().into());
    match outcome {
        TransitionOutcome::Accepted(record) => {
            set_js(&obj, "sequence", JsValue::from_f64(record.sequence as f64));
            set_js(&obj, "from", JsValue::from_f64(record.from as f64));
            set_js(&obj, "to", JsValue::from_f64(record.to as f64));
            set_js(&obj, "reason", JsValue::NULL);
        }
        TransitionOutcome::Ignored(reason) => {
            set_js(&obj, "reason", JsValue::from_str(reason.as_str()));
        }
    }
    obj.into()
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Route `tracing` output to the browser console. Only the first call has
/// an effect. `level` is one of `trace`, `debug`, `info`, `warn`, `error`.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    logging::install(log_level(level.as_deref()));
}

/// Panel-snapping scroll controller bound to the live page.
///
/// Call `start()` once the markup is in the document; setup runs after the
/// configured delay and attaches the wheel, touch, keyboard and scroll-end
/// listeners. Navigation methods return
/// `{ accepted, reason, sequence?, from?, to? }`.
#[wasm_bindgen]
pub struct SnapController {
    shared: SharedRef,
}

#[wasm_bindgen]
impl SnapController {
    /// Create a controller. `container_selector` scopes panel discovery;
    /// `config_json` overrides defaults (`cooldown_ms`, `transition_ms`,
    /// `init_delay_ms`, ...).
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_selector: Option<String>,
        config_json: Option<String>,
    ) -> Result<SnapController, JsValue> {
        install_panic_hook();
        let config = parse_config(config_json.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let backend = DomBackend::new(container_selector.as_deref(), &config.markup);
        let host =
            HostCore::new(backend, config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            shared: Rc::new(RefCell::new(Shared {
                host,
                listeners: None,
                setup_timer: None,
                settle_timer: None,
            })),
        })
    }

    /// Schedule setup after the configured delay.
    pub fn start(&self) {
        let Some(delay) = self.shared.borrow_mut().host.start() else {
            return;
        };
        let weak = Rc::downgrade(&self.shared);
        let scheduled = set_timeout(delay, move || {
            if let Some(shared) = weak.upgrade() {
                on_setup_timer(&shared);
            }
        });
        match scheduled {
            Ok(handle) => self.shared.borrow_mut().setup_timer = Some(handle),
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, error = %err, "setup not scheduled");
            }
        }
    }

    /// Run setup now. Returns the panel count (0 on a non-interactive host).
    pub fn initialize(&self) -> Result<u32, JsValue> {
        match setup(&self.shared) {
            Ok(InitOutcome::Ready { panels }) => Ok(u32::try_from(panels).unwrap_or(u32::MAX)),
            Ok(InitOutcome::Skipped) => Ok(0),
            Err(err) => Err(JsValue::from_str(&err.to_string())),
        }
    }

    /// Install input listeners. Returns whether they are installed.
    pub fn attach(&self) -> bool {
        if self.shared.borrow_mut().host.attach().is_none() {
            return false;
        }
        sync_listeners(&self.shared);
        self.shared.borrow().listeners.is_some()
    }

    /// Remove input listeners. An in-flight transition still settles.
    pub fn detach(&self) -> bool {
        let detached = self.shared.borrow_mut().host.controller_mut().detach();
        sync_listeners(&self.shared);
        detached
    }

    #[wasm_bindgen(js_name = scrollToPanel)]
    pub fn scroll_to_panel(&self, index: u32) -> JsValue {
        let outcome = self
            .shared
            .borrow_mut()
            .host
            .controller_mut()
            .scroll_to_panel(index as usize);
        schedule_settle(&self.shared);
        outcome_to_js(outcome)
    }

    #[wasm_bindgen(js_name = goToNextSection)]
    pub fn go_to_next_section(&self) -> JsValue {
        let outcome = self
            .shared
            .borrow_mut()
            .host
            .controller_mut()
            .go_to_next_section();
        schedule_settle(&self.shared);
        outcome_to_js(outcome)
    }

    #[wasm_bindgen(js_name = goToPrevSection)]
    pub fn go_to_prev_section(&self) -> JsValue {
        let outcome = self
            .shared
            .borrow_mut()
            .host
            .controller_mut()
            .go_to_prev_section();
        schedule_settle(&self.shared);
        outcome_to_js(outcome)
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> u32 {
        let index = self.shared.borrow().host.controller().current_index();
        u32::try_from(index).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen(js_name = panelCount)]
    pub fn panel_count(&self) -> u32 {
        let count = self.shared.borrow().host.controller().panel_count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Setup state: `idle`, `waiting`, `ready`, `failed`, `skipped` or
    /// `destroyed`.
    #[wasm_bindgen(js_name = setupState)]
    pub fn setup_state(&self) -> String {
        self.shared.borrow().host.phase().as_str().to_string()
    }

    /// Why setup failed, if it did.
    #[wasm_bindgen(js_name = setupError)]
    pub fn setup_error(&self) -> Option<String> {
        self.shared
            .borrow()
            .host
            .setup_error()
            .map(ToString::to_string)
    }

    #[wasm_bindgen(js_name = isTransitioning)]
    pub fn is_transitioning(&self) -> bool {
        self.shared.borrow().host.controller().is_transitioning()
    }

    /// Remove listeners, cancel pending setup and the settle timer, and
    /// settle any in-flight transition immediately. The controller cannot be
    /// set up or attached again afterwards.
    pub fn destroy(&self) {
        let (setup_timer, settle_timer) = {
            let mut state = self.shared.borrow_mut();
            state.host.teardown();
            (state.setup_timer.take(), state.settle_timer.take())
        };
        clear_timeout(setup_timer);
        clear_timeout(settle_timer);
        sync_listeners(&self.shared);
    }
}
