//! Property tweens applied to UI elements.
//!
//! An [`Animator`] starts an [`Animation`] and hands back an
//! [`AnimationHandle`]; awaiting the handle replaces completion callbacks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::ui::{ElementId, UiTree};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseOutQuad,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the eased curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => t * (2.0 - t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Opacity,
    TranslateY,
}

impl Property {
    pub fn style_name(self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::TranslateY => "translateY",
        }
    }

    fn render(self, value: f64) -> String {
        match self {
            Property::Opacity => format!("{value:.2}"),
            Property::TranslateY => format!("{value:.0}px"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub property: Property,
    pub from: f64,
    pub to: f64,
}

impl Tween {
    fn value_at(&self, eased: f64) -> f64 {
        self.from + (self.to - self.from) * eased
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub tweens: Vec<Tween>,
    pub duration: Duration,
    pub easing: Easing,
}

impl Animation {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            tweens: Vec::new(),
            duration,
            easing,
        }
    }

    pub fn tween(mut self, property: Property, from: f64, to: f64) -> Self {
        self.tweens.push(Tween { property, from, to });
        self
    }

    /// Fade in while sliding up 30px, used when a wizard step is revealed.
    pub fn step_entrance(duration: Duration) -> Self {
        Self::new(duration, Easing::EaseOutQuad)
            .tween(Property::Opacity, 0.0, 1.0)
            .tween(Property::TranslateY, 30.0, 0.0)
    }

    /// Writes every tween's value at `progress` (linear, `[0, 1]`) onto `target`.
    pub fn apply_at(&self, ui: &dyn UiTree, target: &ElementId, progress: f64) -> bool {
        let eased = self.easing.apply(progress);
        self.tweens.iter().all(|tween| {
            ui.set_style(
                target,
                tween.property.style_name(),
                &tween.property.render(tween.value_at(eased)),
            )
        })
    }
}

/// Completion signal of a running animation.
#[derive(Debug)]
pub struct AnimationHandle {
    done: Option<oneshot::Receiver<()>>,
}

impl AnimationHandle {
    pub fn completed() -> Self {
        Self { done: None }
    }

    fn pending(done: oneshot::Receiver<()>) -> Self {
        Self { done: Some(done) }
    }

    pub fn is_finished(&mut self) -> bool {
        match self.done.as_mut() {
            None => true,
            Some(rx) => !matches!(rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)),
        }
    }

    /// Resolves once the animation has applied its final values (or was dropped).
    pub async fn finished(self) {
        if let Some(rx) = self.done {
            let _ = rx.await;
        }
    }
}

/// Animation engine consumed by the controllers.
pub trait Animator: Send + Sync {
    fn animate(&self, target: &ElementId, animation: Animation) -> AnimationHandle;
}

/// Applies end values immediately.
pub struct ImmediateAnimator {
    ui: Arc<dyn UiTree>,
}

impl ImmediateAnimator {
    pub fn new(ui: Arc<dyn UiTree>) -> Self {
        Self { ui }
    }
}

impl Animator for ImmediateAnimator {
    fn animate(&self, target: &ElementId, animation: Animation) -> AnimationHandle {
        animation.apply_at(self.ui.as_ref(), target, 1.0);
        AnimationHandle::completed()
    }
}

/// Interpolates frames on a tokio task.
pub struct TokioAnimator {
    ui: Arc<dyn UiTree>,
    frame: Duration,
}

impl TokioAnimator {
    pub fn new(ui: Arc<dyn UiTree>) -> Self {
        Self {
            ui,
            frame: FRAME_INTERVAL,
        }
    }
}

impl Animator for TokioAnimator {
    fn animate(&self, target: &ElementId, animation: Animation) -> AnimationHandle {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(element = %target, "no async runtime; applying animation end state");
            animation.apply_at(self.ui.as_ref(), target, 1.0);
            return AnimationHandle::completed();
        };

        let (tx, rx) = oneshot::channel();
        let ui = Arc::clone(&self.ui);
        let target = target.clone();
        let frame = self.frame;
        runtime.spawn(async move {
            let start = tokio::time::Instant::now();
            loop {
                let progress = if animation.duration.is_zero() {
                    1.0
                } else {
                    start.elapsed().as_secs_f64() / animation.duration.as_secs_f64()
                };
                if !animation.apply_at(ui.as_ref(), &target, progress.min(1.0)) {
                    debug!(element = %target, "animation target vanished");
                    break;
                }
                if progress >= 1.0 {
                    break;
                }
                tokio::time::sleep(frame).await;
            }
            let _ = tx.send(());
        });
        AnimationHandle::pending(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{Element, MemoryUi};

    fn ui_with(id: &str) -> Arc<MemoryUi> {
        Arc::new(MemoryUi::with_elements([(
            ElementId::new(id),
            Element::default(),
        )]))
    }

    #[test]
    fn ease_out_quad_hits_endpoints() {
        assert_eq!(Easing::EaseOutQuad.apply(0.0), 0.0);
        assert_eq!(Easing::EaseOutQuad.apply(1.0), 1.0);
        assert!(Easing::EaseOutQuad.apply(0.5) > 0.5);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn immediate_animator_applies_final_values() {
        let ui = ui_with("region");
        let animator = ImmediateAnimator::new(ui.clone());
        let target = ElementId::new("region");
        let mut handle = animator.animate(&target, Animation::step_entrance(Duration::from_millis(400)));
        assert!(handle.is_finished());
        let element = ui.element(&target).unwrap();
        assert_eq!(element.style("opacity"), Some("1.00"));
        assert_eq!(element.style("translateY"), Some("0px"));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_animator_completes_after_duration() {
        let ui = ui_with("region");
        let animator = TokioAnimator::new(ui.clone());
        let target = ElementId::new("region");
        let started = tokio::time::Instant::now();
        animator
            .animate(&target, Animation::step_entrance(Duration::from_millis(400)))
            .finished()
            .await;
        assert!(started.elapsed() >= Duration::from_millis(400));
        assert_eq!(ui.element(&target).unwrap().style("opacity"), Some("1.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_animator_stops_when_target_is_missing() {
        let ui = Arc::new(MemoryUi::new());
        let animator = TokioAnimator::new(ui);
        animator
            .animate(
                &ElementId::new("gone"),
                Animation::step_entrance(Duration::from_secs(10)),
            )
            .finished()
            .await;
    }
}
