// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM surfaces, input wiring and timer scheduling.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use js_sys::{Reflect, WeakMap};
use kurbo::{Point, Size, Vec2};
use peniko::Color;
use pinchzoom::Capabilities;
use pinchzoom::controller::{BindError, BindReport, ResolveError, Suitability, TargetResolver};
use pinchzoom::surface::{BackdropElement, BackdropFactory, Promotion, SurfaceError, ZoomTarget};
use pinchzoom::timer::Millis;
use pinchzoom::{PinchZoom, PinchZoomConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AddEventListenerOptions, Document, Event, HtmlElement, HtmlImageElement, TouchEvent,
    TransitionEvent, Window,
};

use crate::{
    TOUCH_EVENTS, box_size_css, classify, color_css, completes_zoom, transform_css,
    transition_css,
};

fn platform(err: JsValue) -> SurfaceError {
    SurfaceError::Platform(format!("{err:?}"))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Date.now() is a non-negative integral millisecond count"
)]
fn now_ms() -> Millis {
    js_sys::Date::now() as Millis
}

/// A zoomable DOM element.
#[derive(Clone, Debug)]
pub struct HtmlZoomTarget {
    element: HtmlElement,
}

impl HtmlZoomTarget {
    /// Wraps `element`.
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    /// Returns the wrapped element.
    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn set_style(&self, property: &str, value: Option<&str>) -> Result<(), SurfaceError> {
        let style = self.element.style();
        match value {
            Some(value) => style.set_property(property, value).map_err(platform),
            None => style.remove_property(property).map(drop).map_err(platform),
        }
    }
}

impl ZoomTarget for HtmlZoomTarget {
    fn set_transform(&mut self, scale: f64, translate: Vec2) -> Result<(), SurfaceError> {
        if !self.element.is_connected() {
            return Err(SurfaceError::Detached);
        }
        self.set_style("transform", Some(&transform_css(scale, translate)))
    }

    fn set_transition(&mut self, duration_ms: Option<u32>) -> Result<(), SurfaceError> {
        self.set_style("transition", transition_css(duration_ms).as_deref())
    }

    fn natural_size(&self) -> Result<Size, SurfaceError> {
        if let Some(image) = self.element.dyn_ref::<HtmlImageElement>() {
            if image.natural_width() > 0 {
                return Ok(Size::new(
                    f64::from(image.natural_width()),
                    f64::from(image.natural_height()),
                ));
            }
        }
        let rect = self.element.get_bounding_client_rect();
        Ok(Size::new(rect.width(), rect.height()))
    }

    fn set_box_size(&mut self, size: Option<Size>) -> Result<(), SurfaceError> {
        let (width, height) = match size.map(box_size_css) {
            Some((width, height)) => (Some(width), Some(height)),
            None => (None, None),
        };
        self.set_style("width", width.as_deref())?;
        self.set_style("height", height.as_deref())
    }

    fn set_promotion(&mut self, promotion: Option<Promotion>) -> Result<(), SurfaceError> {
        match promotion {
            Some(promotion) => {
                self.set_style("position", Some("relative"))?;
                self.set_style("z-index", Some(&promotion.stacking_order.to_string()))
            }
            None => {
                self.set_style("position", None)?;
                self.set_style("z-index", None)
            }
        }
    }
}

/// `<img>` elements only.
pub fn image_only(target: &HtmlZoomTarget) -> Suitability {
    if target.element.is::<HtmlImageElement>() {
        Suitability::suitable()
    } else {
        Suitability::unsuitable(format!(
            "<{}> is not an image",
            target.element.tag_name().to_lowercase()
        ))
    }
}

/// The full-viewport backdrop `<div>`.
#[derive(Debug)]
pub struct DomBackdrop {
    element: HtmlElement,
}

impl BackdropElement for DomBackdrop {
    fn set_color(&mut self, color: Color) -> Result<(), SurfaceError> {
        self.element
            .style()
            .set_property("background-color", &color_css(color))
            .map_err(platform)
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), SurfaceError> {
        let display = if visible { "block" } else { "none" };
        self.element
            .style()
            .set_property("display", display)
            .map_err(platform)
    }

    fn remove(self) -> Result<(), SurfaceError> {
        self.element.remove();
        Ok(())
    }
}

/// Creates backdrops in a document, one stacking level below zoomed elements.
#[derive(Clone, Debug)]
pub struct DomBackdrops {
    document: Document,
    z_index: u32,
}

impl DomBackdrops {
    /// Backdrops sit just below `stacking_order`.
    #[must_use]
    pub fn new(document: Document, stacking_order: u32) -> Self {
        Self {
            document,
            z_index: stacking_order.saturating_sub(1),
        }
    }
}

impl BackdropFactory for DomBackdrops {
    type Element = DomBackdrop;

    fn create_backdrop(&mut self) -> Result<DomBackdrop, SurfaceError> {
        let body = self
            .document
            .body()
            .ok_or(SurfaceError::Unsupported("document has no body"))?;
        let element: HtmlElement = self
            .document
            .create_element("div")
            .map_err(platform)?
            .dyn_into()
            .map_err(|_| SurfaceError::Unsupported("div is not an HTML element"))?;

        let style = element.style();
        let z_index = self.z_index.to_string();
        for (property, value) in [
            ("position", "fixed"),
            ("inset", "0"),
            ("pointer-events", "none"),
            ("display", "none"),
            ("background-color", "transparent"),
            ("transition", "background-color 100ms linear"),
            ("z-index", z_index.as_str()),
        ] {
            style.set_property(property, value).map_err(platform)?;
        }
        body.append_child(&element).map_err(platform)?;
        Ok(DomBackdrop { element })
    }
}

/// Element identity assigned by [`SelectorResolver`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u32);

/// Resolves CSS selectors in one document.
#[derive(Debug)]
pub struct SelectorResolver {
    document: Document,
    keys: WeakMap,
    next: u32,
}

impl SelectorResolver {
    /// Creates a resolver for `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            keys: WeakMap::new(),
            next: 0,
        }
    }

    fn key_of(&mut self, element: &HtmlElement) -> ElementKey {
        if let Some(key) = self.keys.get(element).as_f64() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "keys are stored from u32 values"
            )]
            return ElementKey(key as u32);
        }
        let key = ElementKey(self.next);
        self.next += 1;
        self.keys.set(element, &JsValue::from(key.0));
        key
    }
}

impl TargetResolver for SelectorResolver {
    type Spec = str;
    type Key = ElementKey;
    type Target = HtmlZoomTarget;

    fn resolve(&mut self, selector: &str) -> Result<Vec<(ElementKey, HtmlZoomTarget)>, ResolveError> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|_| ResolveError::new(format!("`{selector}` is not a valid selector")))?;
        let mut resolved = Vec::new();
        for index in 0..nodes.length() {
            let Some(element) = nodes
                .item(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            resolved.push((self.key_of(&element), HtmlZoomTarget::new(element)));
        }
        Ok(resolved)
    }
}

/// Reads what the running browser supports.
pub fn probe_capabilities(window: &Window) -> Capabilities {
    let mut capabilities = Capabilities::empty();
    if Reflect::has(window, &JsValue::from_str("ontouchstart")).unwrap_or(false) {
        capabilities |= Capabilities::TOUCH;
    }
    let transform = window
        .document()
        .and_then(|document| document.body())
        .map(|body| Reflect::has(&body.style(), &JsValue::from_str("transform")).unwrap_or(false))
        .unwrap_or(false);
    if transform {
        capabilities |= Capabilities::TRANSFORM;
    }
    capabilities
}

type Listener = Closure<dyn FnMut(Event)>;

struct Listeners {
    element: HtmlElement,
    closures: Vec<(&'static str, Listener)>,
}

impl Listeners {
    fn detach(self) {
        for (event_type, closure) in &self.closures {
            if let Err(err) = self
                .element
                .remove_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
            {
                log::warn!("pinchzoom: cannot stop listening for {event_type}: {err:?}");
            }
        }
    }
}

struct Inner {
    zoom: PinchZoom<ElementKey, HtmlZoomTarget, DomBackdrops>,
    listeners: HashMap<ElementKey, Listeners>,
    wake: Option<i32>,
}

type Shared = Rc<RefCell<Inner>>;

/// Pinch-zoom for DOM elements of the current page.
pub struct WebPinchZoom {
    window: Window,
    document: Document,
    resolver: SelectorResolver,
    shared: Shared,
}

impl fmt::Debug for WebPinchZoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = self.shared.try_borrow().map(|inner| inner.zoom.len()).ok();
        f.debug_struct("WebPinchZoom")
            .field("resolver", &self.resolver)
            .field("bound", &bound)
            .finish_non_exhaustive()
    }
}

impl WebPinchZoom {
    /// Creates an adapter for the current window.
    pub fn new() -> Result<Self, SurfaceError> {
        let window = web_sys::window().ok_or(SurfaceError::Unsupported("no window"))?;
        let document = window
            .document()
            .ok_or(SurfaceError::Unsupported("no document"))?;
        Ok(Self {
            resolver: SelectorResolver::new(document.clone()),
            window,
            document,
            shared: Rc::new(RefCell::new(Inner {
                zoom: PinchZoom::new(),
                listeners: HashMap::new(),
                wake: None,
            })),
        })
    }

    /// Binds every `<img>` matching `selector`.
    ///
    /// Newly bound elements share one backdrop. Elements already bound adopt
    /// `config`, clamping a current zoom into the new bounds.
    pub fn bind(
        &mut self,
        selector: &str,
        config: PinchZoomConfig,
    ) -> Result<BindReport<ElementKey>, BindError> {
        let capabilities = probe_capabilities(&self.window);
        let backdrops = DomBackdrops::new(self.document.clone(), config.stacking_order);
        let mut inner = self.shared.borrow_mut();
        let report = inner.zoom.bind(
            &mut self.resolver,
            selector,
            &image_only,
            backdrops,
            config,
            capabilities,
            now_ms(),
        )?;
        for key in &report.bound {
            let Some(session) = inner.zoom.session(key) else {
                continue;
            };
            let element = session.transform().target().element().clone();
            let listeners = listen(&self.shared, *key, element);
            inner.listeners.insert(*key, listeners);
        }
        drop(inner);
        schedule(&self.shared);
        Ok(report)
    }

    /// Removes listeners, restores the element and drops its session.
    ///
    /// The group backdrop is removed with the last element of its group.
    pub fn unbind(&mut self, key: ElementKey) -> bool {
        let mut inner = self.shared.borrow_mut();
        if let Some(listeners) = inner.listeners.remove(&key) {
            listeners.detach();
        }
        let unbound = inner.zoom.unbind(&key, now_ms());
        drop(inner);
        schedule(&self.shared);
        unbound
    }

    /// Unbinds everything.
    pub fn unbind_all(&mut self) {
        let mut inner = self.shared.borrow_mut();
        for (_, listeners) in inner.listeners.drain() {
            listeners.detach();
        }
        inner.zoom.unbind_all(now_ms());
        if let Some(handle) = inner.wake.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    /// Returns `true` if `key` is bound.
    #[must_use]
    pub fn is_bound(&self, key: ElementKey) -> bool {
        self.shared.borrow().zoom.is_bound(&key)
    }

    /// Bound keys, in bind order.
    #[must_use]
    pub fn keys(&self) -> Vec<ElementKey> {
        self.shared.borrow().zoom.keys().to_vec()
    }
}

impl Drop for WebPinchZoom {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

fn touch_points(event: &TouchEvent) -> Vec<Point> {
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|index| touches.item(index))
        .map(|touch| Point::new(f64::from(touch.client_x()), f64::from(touch.client_y())))
        .collect()
}

fn listen(shared: &Shared, key: ElementKey, element: HtmlElement) -> Listeners {
    let options = AddEventListenerOptions::new();
    options.set_passive(false);

    let mut closures: Vec<(&'static str, Listener)> = Vec::new();
    for event_type in TOUCH_EVENTS {
        let weak = Rc::downgrade(shared);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let (Some(phase), Some(touch)) =
                (classify(&event.type_()), event.dyn_ref::<TouchEvent>())
            else {
                return;
            };
            let points = touch_points(touch);
            let handled = match shared.try_borrow_mut() {
                Ok(mut inner) => inner.zoom.handle_input(&key, phase, &points, now_ms()),
                Err(_) => None,
            };
            if handled.is_some() {
                event.prevent_default();
            }
            schedule(&shared);
        }) as Box<dyn FnMut(Event)>);
        closures.push((event_type, closure));
    }

    let weak = Rc::downgrade(shared);
    let transition_end = Closure::wrap(Box::new(move |event: Event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let finished = event
            .dyn_ref::<TransitionEvent>()
            .is_some_and(|event| completes_zoom(&event.property_name()));
        if !finished {
            return;
        }
        if let Ok(mut inner) = shared.try_borrow_mut() {
            inner.zoom.transition_ended(&key, now_ms());
        }
        schedule(&shared);
    }) as Box<dyn FnMut(Event)>);
    closures.push(("transitionend", transition_end));

    for (event_type, closure) in &closures {
        if let Err(err) = element.add_event_listener_with_callback_and_add_event_listener_options(
            event_type,
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            log::warn!("pinchzoom: cannot listen for {event_type}: {err:?}");
        }
    }
    Listeners { element, closures }
}

/// Re-arms the single wake-up at the earliest pending deadline.
fn schedule(shared: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(mut inner) = shared.try_borrow_mut() else {
        return;
    };
    if let Some(handle) = inner.wake.take() {
        window.clear_timeout_with_handle(handle);
    }
    let Some(deadline) = inner.zoom.next_deadline() else {
        return;
    };
    let delay = i32::try_from(deadline.saturating_sub(now_ms())).unwrap_or(i32::MAX);

    let weak: Weak<RefCell<Inner>> = Rc::downgrade(shared);
    let wake = Closure::once_into_js(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if let Ok(mut inner) = shared.try_borrow_mut() {
            inner.wake = None;
            inner.zoom.poll(now_ms());
        }
        schedule(&shared);
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(wake.unchecked_ref(), delay)
    {
        Ok(handle) => inner.wake = Some(handle),
        Err(err) => log::warn!("pinchzoom: cannot schedule timers: {err:?}"),
    }
}
