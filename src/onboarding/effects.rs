//! Reveal effects and the cue plans that schedule them.

use std::f32::consts::TAU;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use super::reveal::RevealPhase;
use super::timeline::Timeline;
use crate::config::RevealTimings;
use crate::feedback::FeedbackCue;

pub const PARTICLE_COUNT: usize = 18;
const PARTICLE_STAGGER: Duration = Duration::from_millis(50);

/// Screen position of the triggering tap.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One glowing orb, positioned relative to the emission origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Particle {
    pub dx: f32,
    pub dy: f32,
    pub size: f32,
    pub opacity: f32,
    pub delay_ms: u64,
}

impl Particle {
    /// Lay out [`PARTICLE_COUNT`] orbs evenly around a ring with randomised
    /// radius, size and opacity, each starting a little after the previous.
    pub fn ring<R: Rng + ?Sized>(rng: &mut R) -> Vec<Particle> {
        (0..PARTICLE_COUNT)
            .map(|i| {
                let angle = i as f32 / PARTICLE_COUNT as f32 * TAU;
                let radius: f32 = rng.gen_range(80.0..200.0);
                Particle {
                    dx: angle.cos() * radius,
                    dy: angle.sin() * radius,
                    size: rng.gen_range(8.0..16.0),
                    opacity: rng.gen_range(0.3..0.8),
                    delay_ms: PARTICLE_STAGGER.as_millis() as u64 * i as u64,
                }
            })
            .collect()
    }
}

/// A visual effect start.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum RevealEffect {
    AmbientBackground,
    RadialBurst { origin: TouchPoint },
    ParticleEmission { origin: TouchPoint, particles: Vec<Particle> },
    InspirationalCaption,
    CompletionBadge,
    AchievementConfirmation,
    RingCompletion,
    ContentReveal,
}

/// One scheduled entry of the reveal.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Phase(RevealPhase),
    Effect(RevealEffect),
    Feedback(FeedbackCue),
}

impl Cue {
    pub fn is_effect(&self) -> bool {
        matches!(self, Self::Effect(_))
    }
}

/// Full celebration anchored at `origin`. Overlapping effects are expected;
/// nothing waits for an earlier effect to finish.
pub fn full_plan<R: Rng + ?Sized>(
    timings: &RevealTimings,
    origin: TouchPoint,
    rng: &mut R,
) -> Timeline<Cue> {
    Timeline::new()
        .at(timings.burst, Cue::Feedback(FeedbackCue::Success))
        .at(timings.burst, Cue::Effect(RevealEffect::AmbientBackground))
        .at(timings.burst, Cue::Effect(RevealEffect::RadialBurst { origin }))
        .at(
            timings.particles,
            Cue::Effect(RevealEffect::ParticleEmission {
                origin,
                particles: Particle::ring(rng),
            }),
        )
        .at(timings.caption, Cue::Effect(RevealEffect::InspirationalCaption))
        .at(timings.celebrating, Cue::Phase(RevealPhase::Celebrating))
        .at(timings.badge, Cue::Effect(RevealEffect::CompletionBadge))
        .at(timings.achievement, Cue::Effect(RevealEffect::AchievementConfirmation))
        .at(timings.achievement, Cue::Feedback(FeedbackCue::Achievement))
        .at(timings.ring, Cue::Effect(RevealEffect::RingCompletion))
        .at(timings.ring, Cue::Feedback(FeedbackCue::RingCompletion))
        .at(timings.reveal, Cue::Phase(RevealPhase::Revealing))
        .at(timings.reveal, Cue::Effect(RevealEffect::ContentReveal))
        .at(timings.journey_haptic, Cue::Feedback(FeedbackCue::JourneyBegin))
        .at(timings.complete, Cue::Phase(RevealPhase::Complete))
}

/// Reduced-motion path: the confirmation feedback and nothing visual.
pub fn reduced_plan(timings: &RevealTimings) -> Timeline<Cue> {
    Timeline::new()
        .at(Duration::ZERO, Cue::Feedback(FeedbackCue::Success))
        .at(timings.reduced_motion_complete, Cue::Phase(RevealPhase::Complete))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn phases(plan: &Timeline<Cue>) -> Vec<RevealPhase> {
        plan.entries()
            .into_iter()
            .filter_map(|(_, cue)| match cue {
                Cue::Phase(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_plan_phase_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = full_plan(&RevealTimings::default(), TouchPoint::new(10.0, 20.0), &mut rng);
        assert_eq!(
            phases(&plan),
            vec![
                RevealPhase::Celebrating,
                RevealPhase::Revealing,
                RevealPhase::Complete
            ]
        );

        let last = plan.entries().last().map(|(offset, _)| *offset);
        assert_eq!(last, Some(Duration::from_millis(3000)));
        assert_eq!(plan.entries().iter().filter(|(_, c)| c.is_effect()).count(), 8);
    }

    #[test]
    fn effects_anchor_on_tap() {
        let origin = TouchPoint::new(120.0, 480.0);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = full_plan(&RevealTimings::default(), origin, &mut rng);
        let anchored = plan
            .entries()
            .iter()
            .filter(|(_, cue)| {
                matches!(
                    cue,
                    Cue::Effect(RevealEffect::RadialBurst { origin: o })
                        | Cue::Effect(RevealEffect::ParticleEmission { origin: o, .. })
                        if *o == origin
                )
            })
            .count();
        assert_eq!(anchored, 2);
    }

    #[test]
    fn reduced_plan_is_visually_inert_and_faster() {
        let timings = RevealTimings::default();
        let plan = reduced_plan(&timings);
        assert!(plan.entries().iter().all(|(_, c)| !c.is_effect()));
        assert_eq!(phases(&plan), vec![RevealPhase::Complete]);
        let end = plan.entries().last().map(|(o, _)| *o);
        assert!(end < Some(timings.complete));
    }

    #[test]
    fn particle_ring_layout() {
        let mut rng = StdRng::seed_from_u64(42);
        let particles = Particle::ring(&mut rng);
        assert_eq!(particles.len(), PARTICLE_COUNT);
        for (i, p) in particles.iter().enumerate() {
            let radius = (p.dx * p.dx + p.dy * p.dy).sqrt();
            assert!((79.9..200.1).contains(&radius), "radius {radius}");
            assert!((8.0..16.0).contains(&p.size));
            assert!((0.3..0.8).contains(&p.opacity));
            assert_eq!(p.delay_ms, 50 * i as u64);
        }
        // First orb sits on the positive x axis.
        assert!(particles[0].dy.abs() < 1e-3);
    }
}
