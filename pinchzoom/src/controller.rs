// Copyright 2026 the Pinchzoom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of bound elements.
//!
//! [`PinchZoom`] owns one [`Session`] per bound element, keyed by an element
//! identity chosen by the embedder (a DOM node id, an index, a handle). All
//! "already bound" checks and lookups go through this registry; nothing is
//! stashed on the elements themselves.
//!
//! Binding goes through two collaborators:
//!
//! - a [`TargetResolver`] turning an opaque specifier into candidate elements;
//! - a [`SuitabilityCheck`] deciding per candidate whether it can be zoomed.
//!
//! Only an unusable specifier fails a bind. Unsuitable candidates are skipped
//! with an advisory and the rest still bind; binding an element twice adopts
//! the new configuration instead.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::backdrop::BackdropDriver;
use crate::capability::Capabilities;
use crate::color::ColorSpec;
use crate::config::{ConfigIssue, PinchZoomConfig};
use crate::geometry::TouchPoint;
use crate::gesture::{GestureEvent, InputPhase};
use crate::session::Session;
use crate::surface::{BackdropFactory, ZoomTarget};
use crate::timer::{Millis, earliest};

/// The target specifier could not be resolved at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveError {
    /// What was wrong with the specifier.
    pub reason: String,
}

impl ResolveError {
    /// Creates a resolve error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid target specifier: {}", self.reason)
    }
}

impl core::error::Error for ResolveError {}

/// Error returned by [`PinchZoom::bind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindError {
    /// The specifier could not be resolved; nothing was bound.
    InvalidTarget(ResolveError),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTarget(err) => write!(f, "cannot bind: {err}"),
        }
    }
}

impl core::error::Error for BindError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidTarget(err) => Some(err),
        }
    }
}

/// Turns an opaque target specifier into candidate elements.
pub trait TargetResolver {
    /// The specifier type (a selector string, a handle, a collection).
    type Spec: ?Sized;
    /// Element identity used as the registry key.
    type Key;
    /// The element handle.
    type Target;

    /// Resolves `spec` to an ordered candidate list. An empty list is a valid result.
    fn resolve(
        &mut self,
        spec: &Self::Spec,
    ) -> Result<Vec<(Self::Key, Self::Target)>, ResolveError>;
}

/// Verdict of a [`SuitabilityCheck`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suitability {
    /// Whether the element can be bound.
    pub suitable: bool,
    /// Optional explanation, reported when the element is skipped.
    pub advisory: Option<String>,
}

impl Suitability {
    /// The element can be bound.
    #[must_use]
    pub fn suitable() -> Self {
        Self {
            suitable: true,
            advisory: None,
        }
    }

    /// The element cannot be bound, for `reason`.
    pub fn unsuitable(reason: impl Into<String>) -> Self {
        Self {
            suitable: false,
            advisory: Some(reason.into()),
        }
    }
}

/// Decides whether a candidate element can be zoomed.
pub trait SuitabilityCheck<T: ?Sized> {
    /// Checks one candidate.
    fn check(&self, target: &T) -> Suitability;
}

impl<T: ?Sized, F: Fn(&T) -> Suitability> SuitabilityCheck<T> for F {
    fn check(&self, target: &T) -> Suitability {
        self(target)
    }
}

/// Accepts every candidate.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl<T: ?Sized> SuitabilityCheck<T> for AcceptAll {
    fn check(&self, _: &T) -> Suitability {
        Suitability::suitable()
    }
}

/// Outcome of a successful [`PinchZoom::bind`].
#[derive(Clone, Debug, PartialEq)]
pub struct BindReport<K> {
    /// Newly bound elements, in resolution order.
    pub bound: Vec<K>,
    /// Elements that were already bound and adopted the new configuration.
    pub rebound: Vec<K>,
    /// Elements left unbound, with the checker's advisory.
    pub skipped: Vec<(K, Option<String>)>,
    /// Configuration fields replaced by their defaults.
    pub config_issues: Vec<ConfigIssue>,
}

impl<K> Default for BindReport<K> {
    fn default() -> Self {
        Self {
            bound: Vec::new(),
            rebound: Vec::new(),
            skipped: Vec::new(),
            config_issues: Vec::new(),
        }
    }
}

/// Owns every bound element's session.
pub struct PinchZoom<K, T, F: BackdropFactory> {
    order: Vec<K>,
    sessions: HashMap<K, Session<T, F>>,
}

impl<K: fmt::Debug, T, F: BackdropFactory> fmt::Debug for PinchZoom<K, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinchZoom")
            .field("bound", &self.order)
            .finish_non_exhaustive()
    }
}

impl<K, T, F: BackdropFactory> Default for PinchZoom<K, T, F> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            sessions: HashMap::new(),
        }
    }
}

impl<K, T, F> PinchZoom<K, T, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    T: ZoomTarget,
    F: BackdropFactory + 'static,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `spec` and binds every suitable candidate.
    ///
    /// Newly bound elements share one backdrop built from `backdrops`.
    /// Already bound elements adopt `config` instead. The configuration is
    /// validated first; replaced fields are reported, never fatal.
    #[allow(
        clippy::too_many_arguments,
        reason = "bind takes every host surface at once"
    )]
    pub fn bind<R, C>(
        &mut self,
        resolver: &mut R,
        spec: &R::Spec,
        checker: &C,
        backdrops: F,
        config: PinchZoomConfig,
        capabilities: Capabilities,
        now: Millis,
    ) -> Result<BindReport<K>, BindError>
    where
        R: TargetResolver<Key = K, Target = T> + ?Sized,
        C: SuitabilityCheck<T> + ?Sized,
    {
        let candidates = resolver.resolve(spec).map_err(BindError::InvalidTarget)?;
        let (config, config_issues) = config.validated();
        let mut report = BindReport {
            config_issues,
            ..BindReport::default()
        };

        if candidates.is_empty() {
            log::warn!("pinchzoom: no elements matched the target specifier");
            return Ok(report);
        }
        if !capabilities.touch_supported() {
            log::warn!("pinchzoom: touch input unavailable, pinch gestures cannot start");
        }

        let backdrop = Rc::new(RefCell::new(BackdropDriver::new(
            backdrops,
            ColorSpec::parse(&config.background_color),
        )));

        for (key, target) in candidates {
            if let Some(session) = self.sessions.get_mut(&key) {
                session.rebind(config.clone(), now);
                report.rebound.push(key);
                continue;
            }
            let verdict = checker.check(&target);
            if !verdict.suitable {
                match &verdict.advisory {
                    Some(reason) => log::warn!("pinchzoom: skipping {key:?}: {reason}"),
                    None => log::warn!("pinchzoom: skipping unsuitable element {key:?}"),
                }
                report.skipped.push((key, verdict.advisory));
                continue;
            }
            let session = Session::new(target, Rc::clone(&backdrop), config.clone(), capabilities);
            log::debug!("pinchzoom: bound {key:?}");
            self.sessions.insert(key.clone(), session);
            self.order.push(key.clone());
            report.bound.push(key);
        }
        Ok(report)
    }

    /// Returns `true` if `key` is bound.
    #[must_use]
    pub fn is_bound(&self, key: &K) -> bool {
        self.sessions.contains_key(key)
    }

    /// Bound keys, in bind order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.order
    }

    /// Number of bound elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the session of `key`.
    #[must_use]
    pub fn session(&self, key: &K) -> Option<&Session<T, F>> {
        self.sessions.get(key)
    }

    /// Feeds a classified input event to the session of `key`.
    ///
    /// Returns the recognized gesture event, if any; the caller should then
    /// suppress the platform's default handling.
    pub fn handle_input(
        &mut self,
        key: &K,
        phase: InputPhase,
        points: &[TouchPoint],
        now: Millis,
    ) -> Option<GestureEvent> {
        self.sessions.get_mut(key)?.handle_input(phase, points, now)
    }

    /// Platform signal: the transform transition of `key` finished.
    pub fn transition_ended(&mut self, key: &K, now: Millis) {
        if let Some(session) = self.sessions.get_mut(key) {
            session.transition_ended(now);
        }
    }

    /// Earliest pending deadline across all sessions.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.sessions
            .values()
            .fold(None, |acc, session| earliest(acc, session.next_deadline()))
    }

    /// Runs every expired timer.
    pub fn poll(&mut self, now: Millis) {
        for key in &self.order {
            if let Some(session) = self.sessions.get_mut(key) {
                session.poll(now);
            }
        }
    }

    /// Adopts a new configuration for `key`. Returns `false` if it is not bound.
    pub fn rebind(&mut self, key: &K, config: PinchZoomConfig, now: Millis) -> bool {
        let Some(session) = self.sessions.get_mut(key) else {
            return false;
        };
        let (config, _) = config.validated();
        session.rebind(config, now);
        true
    }

    /// Adopts a new configuration for every bound element.
    pub fn rebind_all(&mut self, config: PinchZoomConfig, now: Millis) -> Vec<ConfigIssue> {
        let (config, issues) = config.validated();
        for session in self.sessions.values_mut() {
            session.rebind(config.clone(), now);
        }
        issues
    }

    /// Tears down and forgets `key`. Returns `false` if it was not bound.
    ///
    /// The group backdrop is removed with its last bound element.
    pub fn unbind(&mut self, key: &K, now: Millis) -> bool {
        let Some(mut session) = self.sessions.remove(key) else {
            return false;
        };
        self.order.retain(|k| k != key);
        session.teardown(now);
        log::debug!("pinchzoom: unbound {key:?}");
        true
    }

    /// Tears down every bound element.
    pub fn unbind_all(&mut self, now: Millis) {
        for key in core::mem::take(&mut self.order) {
            if let Some(mut session) = self.sessions.remove(&key) {
                session.teardown(now);
                log::debug!("pinchzoom: unbound {key:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackdrops, MockTarget};
    use alloc::vec;
    use kurbo::Point;

    /// Resolves `"all"` to three targets and `"none"` to nothing; anything else is invalid.
    struct Fixture;

    impl TargetResolver for Fixture {
        type Spec = str;
        type Key = u32;
        type Target = MockTarget;

        fn resolve(&mut self, spec: &str) -> Result<Vec<(u32, MockTarget)>, ResolveError> {
            match spec {
                "all" => Ok((1..=3).map(|k| (k, MockTarget::new())).collect()),
                "none" => Ok(Vec::new()),
                other => Err(ResolveError::new(other)),
            }
        }
    }

    type Registry = PinchZoom<u32, MockTarget, MockBackdrops>;

    fn bind_all(registry: &mut Registry, config: PinchZoomConfig) -> BindReport<u32> {
        registry
            .bind(
                &mut Fixture,
                "all",
                &AcceptAll,
                MockBackdrops::default(),
                config,
                Capabilities::default(),
                0,
            )
            .unwrap()
    }

    fn pair(bx: f64) -> [Point; 2] {
        [Point::ZERO, Point::new(bx, 0.0)]
    }

    #[test]
    fn invalid_specifier_is_an_error() {
        let mut registry = Registry::new();
        let err = registry
            .bind(
                &mut Fixture,
                "???",
                &AcceptAll,
                MockBackdrops::default(),
                PinchZoomConfig::default(),
                Capabilities::default(),
                0,
            )
            .unwrap_err();
        assert_eq!(err, BindError::InvalidTarget(ResolveError::new("???")));
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_resolution_binds_nothing() {
        let mut registry = Registry::new();
        let report = registry
            .bind(
                &mut Fixture,
                "none",
                &AcceptAll,
                MockBackdrops::default(),
                PinchZoomConfig::default(),
                Capabilities::default(),
                0,
            )
            .unwrap();
        assert_eq!(report, BindReport::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn bind_keeps_resolution_order() {
        let mut registry = Registry::new();
        let report = bind_all(&mut registry, PinchZoomConfig::default());
        assert_eq!(report.bound, vec![1, 2, 3]);
        assert_eq!(registry.keys(), &[1, 2, 3]);
        assert_eq!(registry.len(), 3);
        assert!(registry.is_bound(&2));
    }

    #[test]
    fn unsuitable_elements_are_skipped() {
        let mut registry = Registry::new();
        let sized_only = |t: &MockTarget| {
            if t.natural.width > 0.0 {
                Suitability::unsuitable("not an image")
            } else {
                Suitability::suitable()
            }
        };
        let report = registry
            .bind(
                &mut Fixture,
                "all",
                &sized_only,
                MockBackdrops::default(),
                PinchZoomConfig::default(),
                Capabilities::default(),
                0,
            )
            .unwrap();
        assert!(report.bound.is_empty());
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(report.skipped[0], (1, Some("not an image".into())));
        assert!(registry.is_empty());
    }

    #[test]
    fn binding_twice_rebinds() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        let report = bind_all(
            &mut registry,
            PinchZoomConfig {
                max_scale: 2.0,
                ..PinchZoomConfig::default()
            },
        );
        assert!(report.bound.is_empty());
        assert_eq!(report.rebound, vec![1, 2, 3]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.session(&1).unwrap().config().max_scale, 2.0);
    }

    #[test]
    fn invalid_config_is_repaired_and_reported() {
        let mut registry = Registry::new();
        let report = bind_all(
            &mut registry,
            PinchZoomConfig {
                min_scale: -1.0,
                ..PinchZoomConfig::default()
            },
        );
        assert_eq!(report.config_issues, vec![ConfigIssue::InvalidMinScale(-1.0)]);
        assert_eq!(report.bound.len(), 3);
        assert_eq!(registry.session(&3).unwrap().config().min_scale, 1.0);
    }

    #[test]
    fn group_shares_one_backdrop() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        let a = registry.session(&1).unwrap().backdrop();
        let b = registry.session(&3).unwrap().backdrop();
        assert!(Rc::ptr_eq(a, b));
    }

    #[test]
    fn group_backdrop_goes_with_last_member() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        registry.handle_input(&1, InputPhase::Start, &pair(100.0), 0);
        registry.handle_input(&1, InputPhase::Move, &pair(300.0), 16);
        let backdrop = Rc::clone(registry.session(&3).unwrap().backdrop());
        let removed = Rc::clone(&backdrop.borrow().factory().removed);

        assert!(registry.unbind(&1, 20));
        assert!(registry.unbind(&2, 20));
        assert!(backdrop.borrow().state().has_element);
        assert_eq!(removed.get(), 0);
        drop(backdrop);

        // The zoomed member left, so the backdrop is still usable by the rest.
        registry.handle_input(&3, InputPhase::Start, &pair(100.0), 30);
        registry.handle_input(&3, InputPhase::Move, &pair(300.0), 46);
        assert!(registry.session(&3).unwrap().backdrop().borrow().state().visible);

        registry.unbind_all(60);
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn gestures_on_one_element_leave_others_alone() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        registry.handle_input(&1, InputPhase::Start, &pair(100.0), 0);
        registry.handle_input(&1, InputPhase::Move, &pair(200.0), 16);

        assert!(registry.session(&1).unwrap().is_zoomed());
        assert!(!registry.session(&2).unwrap().is_zoomed());
        assert!(!registry.session(&2).unwrap().interpreter().is_active());
        assert_eq!(registry.handle_input(&9, InputPhase::Start, &pair(1.0), 0), None);
    }

    #[test]
    fn rebind_single_and_all() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        assert!(registry.rebind(
            &2,
            PinchZoomConfig {
                max_scale: 3.0,
                ..PinchZoomConfig::default()
            },
            0,
        ));
        assert!(!registry.rebind(&7, PinchZoomConfig::default(), 0));
        assert_eq!(registry.session(&2).unwrap().config().max_scale, 3.0);
        assert_eq!(registry.session(&1).unwrap().config().max_scale, 4.0);

        let issues = registry.rebind_all(
            PinchZoomConfig {
                max_scale: f64::NAN,
                ..PinchZoomConfig::default()
            },
            0,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(registry.session(&2).unwrap().config().max_scale, 4.0);
    }

    #[test]
    fn unbind_removes_and_tears_down() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        registry.handle_input(&2, InputPhase::Start, &pair(100.0), 0);

        assert!(registry.unbind(&2, 10));
        assert!(!registry.unbind(&2, 10));
        assert!(!registry.is_bound(&2));
        assert_eq!(registry.keys(), &[1, 3]);
        assert_eq!(registry.handle_input(&2, InputPhase::Move, &pair(300.0), 5), None);

        registry.unbind_all(20);
        assert!(registry.is_empty());
        assert_eq!(registry.next_deadline(), None);
    }

    #[test]
    fn deadlines_aggregate_and_poll() {
        let mut registry = Registry::new();
        bind_all(&mut registry, PinchZoomConfig::default());
        assert_eq!(registry.next_deadline(), None);

        registry.handle_input(&1, InputPhase::Start, &pair(100.0), 0);
        registry.handle_input(&1, InputPhase::Move, &pair(200.0), 10);
        registry.handle_input(&1, InputPhase::End, &[], 20);
        let deadline = registry.next_deadline().unwrap();
        assert!(deadline > 20);

        while let Some(deadline) = registry.next_deadline() {
            registry.poll(deadline);
        }
        let session = registry.session(&1).unwrap();
        assert!(!session.transform().is_promoted());
        assert!(!session.is_zoomed());
        assert!(!session.backdrop().borrow().state().visible);
    }
}
