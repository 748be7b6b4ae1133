//! Settle transitions
//!
//! A settle moves the position to a resolved snap point with either a spring
//! (seeded with the release velocity) or a fixed-duration tween, depending
//! on the configured animation.

use glide_animation::{Spring, Tween};

use crate::config::AnimationConfig;
use crate::events::{SettleReason, TransitionId};
use crate::resolver::Resolution;

#[derive(Clone, Copy, Debug)]
enum Driver {
    Spring(Spring),
    Tween(Tween),
}

#[derive(Clone, Debug)]
pub(crate) struct Settle {
    pub(crate) id: TransitionId,
    pub(crate) target: Resolution,
    pub(crate) reason: SettleReason,
    driver: Driver,
}

impl Settle {
    pub(crate) fn new(
        id: TransitionId,
        from: f32,
        velocity: f32,
        target: Resolution,
        reason: SettleReason,
        animation: &AnimationConfig,
    ) -> Self {
        let driver = match *animation {
            AnimationConfig::Spring(config) => {
                let mut spring = Spring::with_velocity(config, from, velocity);
                spring.set_target(target.position);
                Driver::Spring(spring)
            }
            AnimationConfig::Timing {
                duration_ms,
                easing,
            } => Driver::Tween(Tween::new(from, target.position, duration_ms, easing)),
        };
        Self {
            id,
            target,
            reason,
            driver,
        }
    }

    pub(crate) fn position(&self) -> f32 {
        match &self.driver {
            Driver::Spring(spring) => spring.value(),
            Driver::Tween(tween) => tween.value(),
        }
    }

    /// Advance by `dt` seconds; returns `true` while still moving
    pub(crate) fn tick(&mut self, dt: f32) -> bool {
        match &mut self.driver {
            Driver::Spring(spring) => spring.step(dt),
            Driver::Tween(tween) => tween.tick(dt * 1000.0),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        match &self.driver {
            Driver::Spring(spring) => spring.is_settled(),
            Driver::Tween(tween) => tween.is_finished(),
        }
    }

    /// Head for a new destination without a jump
    pub(crate) fn retarget(&mut self, target: Resolution) {
        self.target = target;
        match &mut self.driver {
            Driver::Spring(spring) => spring.set_target(target.position),
            Driver::Tween(tween) => {
                let duration = tween.duration_ms();
                tween.retarget(target.position, duration);
            }
        }
    }
}
