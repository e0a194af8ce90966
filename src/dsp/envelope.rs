//! Three-segment linear amplitude envelope.

use crate::node::AudioContext;

/// Where the envelope is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Ramping 0 -> 1.
    Attack,
    /// Holding at 1 until released.
    Sustain,
    /// Ramping from the release level down to 0.
    Release,
    /// Silent until the next reset.
    Done,
}

/// Levels `0, 1, 1, 0` over three linear segments, sustaining at point 2.
///
/// The hold segment between the two level-1 points takes no time, so after the
/// attack the envelope sits at 1 until [`release`](Self::release) is called.
/// A freshly built envelope is `Done`; call [`reset`](Self::reset) to start it.
#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: f32,
    attack_samples: u32,
    release_samples: u32,
    phase: Phase,
    /// Samples elapsed in the current segment.
    pos: u32,
    level: f32,
    /// Level at the moment release started.
    release_from: f32,
}

impl Envelope {
    pub fn new(ctx: &AudioContext, attack_secs: f32, release_secs: f32) -> Self {
        let mut env = Self {
            sample_rate: ctx.sample_rate as f32,
            attack_samples: 1,
            release_samples: 1,
            phase: Phase::Done,
            pos: 0,
            level: 0.0,
            release_from: 0.0,
        };
        env.set_attack(attack_secs);
        env.set_release(release_secs);
        env
    }

    /// Length of segment 0. Takes effect immediately, even mid-attack: the
    /// ramp keeps its progress and continues at the new slope.
    pub fn set_attack(&mut self, secs: f32) {
        let len = self.to_samples(secs);
        if self.phase == Phase::Attack {
            self.pos = rescale(self.pos, self.attack_samples, len);
        }
        self.attack_samples = len;
    }

    /// Length of segment 2. Takes effect immediately, even mid-release.
    pub fn set_release(&mut self, secs: f32) {
        let len = self.to_samples(secs);
        if self.phase == Phase::Release {
            self.pos = rescale(self.pos, self.release_samples, len);
        }
        self.release_samples = len;
    }

    /// Restart from level 0 at the beginning of the attack.
    pub fn reset(&mut self) {
        self.phase = Phase::Attack;
        self.pos = 0;
        self.level = 0.0;
    }

    /// Start the release ramp from the current level.
    ///
    /// Only meaningful while attacking or sustaining; a second call, or a call
    /// on a finished envelope, does nothing.
    pub fn release(&mut self) {
        match self.phase {
            Phase::Attack | Phase::Sustain => {
                self.phase = Phase::Release;
                self.pos = 0;
                self.release_from = self.level;
            }
            Phase::Release | Phase::Done => {}
        }
    }

    /// Jump straight to `Done`.
    pub fn stop(&mut self) {
        self.phase = Phase::Done;
        self.pos = 0;
        self.level = 0.0;
    }

    /// Advance one sample and return the level for it.
    #[inline]
    pub fn process(&mut self) -> f32 {
        match self.phase {
            Phase::Attack => {
                self.level = progress(self.pos, self.attack_samples);
                self.pos += 1;
                if self.pos >= self.attack_samples {
                    self.phase = Phase::Sustain;
                    self.pos = 0;
                }
            }
            Phase::Sustain => {
                self.level = 1.0;
            }
            Phase::Release => {
                self.level = self.release_from * (1.0 - progress(self.pos, self.release_samples));
                self.pos += 1;
                if self.pos >= self.release_samples {
                    self.phase = Phase::Done;
                    self.pos = 0;
                }
            }
            Phase::Done => {
                self.level = 0.0;
            }
        }
        self.level
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn done(&self) -> bool {
        self.phase == Phase::Done
    }

    fn to_samples(&self, secs: f32) -> u32 {
        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        ((secs * self.sample_rate).round() as u32).max(1)
    }
}

/// Fraction of a segment covered after `pos` samples, never past the end.
#[inline]
fn progress(pos: u32, len: u32) -> f32 {
    (pos as f32 / len as f32).min(1.0)
}

/// Map `pos` in a segment of `from` samples onto one of `to` samples.
///
/// Rounds up so the level never steps backwards on the next sample.
fn rescale(pos: u32, from: u32, to: u32) -> u32 {
    let scaled = (pos as u64 * to as u64 + from as u64 - 1) / from as u64;
    scaled.min(to as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AudioContext {
        // 1 kHz keeps the segment lengths readable
        AudioContext::new(1000, 64)
    }

    #[test]
    fn new_envelope_is_silent() {
        let mut env = Envelope::new(&ctx(), 0.01, 0.01);
        assert!(env.done());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn attack_ramps_then_sustains() {
        let mut env = Envelope::new(&ctx(), 0.01, 0.02);
        env.reset();
        assert_eq!(env.phase(), Phase::Attack);

        let attack: Vec<f32> = (0..10).map(|_| env.process()).collect();
        assert_eq!(attack[0], 0.0);
        assert!((attack[5] - 0.5).abs() < 1e-6);
        assert!(attack.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(env.phase(), Phase::Sustain);

        for _ in 0..1000 {
            assert_eq!(env.process(), 1.0);
        }
        assert!(!env.done());
    }

    #[test]
    fn release_ramps_to_done() {
        let mut env = Envelope::new(&ctx(), 0.001, 0.02);
        env.reset();
        for _ in 0..5 {
            env.process();
        }
        env.release();
        assert_eq!(env.phase(), Phase::Release);

        let tail: Vec<f32> = (0..20).map(|_| env.process()).collect();
        assert_eq!(tail[0], 1.0);
        assert!(tail.windows(2).all(|w| w[1] < w[0]));
        assert!(env.done());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn release_during_attack_starts_from_current_level() {
        let mut env = Envelope::new(&ctx(), 0.1, 0.01);
        env.reset();
        for _ in 0..51 {
            env.process();
        }
        let level = env.level();
        env.release();
        assert!((env.process() - level).abs() < 1e-6);
        assert!(level < 1.0);
    }

    #[test]
    fn second_release_is_a_no_op() {
        let run = |double: bool| {
            let mut env = Envelope::new(&ctx(), 0.005, 0.05);
            env.reset();
            for _ in 0..10 {
                env.process();
            }
            env.release();
            let mut out = Vec::new();
            for i in 0..60 {
                if double && i == 20 {
                    env.release();
                }
                out.push(env.process());
            }
            (out, env.done())
        };
        assert_eq!(run(false), run(true));
    }

    #[test]
    fn reset_after_done_restarts() {
        let mut env = Envelope::new(&ctx(), 0.002, 0.002);
        env.reset();
        env.release();
        while !env.done() {
            env.process();
        }
        env.reset();
        assert_eq!(env.phase(), Phase::Attack);
        assert_eq!(env.process(), 0.0);
        assert!(env.process() > 0.0);
    }

    #[test]
    fn segment_lengths_are_at_least_one_sample() {
        let mut env = Envelope::new(&ctx(), 0.0, -1.0);
        env.reset();
        assert_eq!(env.process(), 0.0);
        assert_eq!(env.process(), 1.0);
        env.release();
        assert_eq!(env.process(), 1.0);
        assert!(env.done());
    }

    /// Run `n` samples, checking every level stays in range.
    fn levels(env: &mut Envelope, n: usize) -> Vec<f32> {
        (0..n)
            .map(|_| {
                let l = env.process();
                assert!((0.0..=1.0).contains(&l), "level {} out of range", l);
                l
            })
            .collect()
    }

    #[test]
    fn shortening_attack_mid_ramp_stays_in_range() {
        let mut env = Envelope::new(&ctx(), 3.0, 0.1);
        env.reset();
        let before = levels(&mut env, 1000);
        env.set_attack(0.01);
        let after = levels(&mut env, 20);

        let mut all = before;
        all.extend(after);
        assert!(all.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(env.phase(), Phase::Sustain);
        assert_eq!(env.level(), 1.0);
    }

    #[test]
    fn lengthening_attack_keeps_progress() {
        let mut env = Envelope::new(&ctx(), 0.1, 0.1);
        env.reset();
        let before = levels(&mut env, 50);
        env.set_attack(1.0);
        let after = levels(&mut env, 10);
        assert!((after[0] - 0.5).abs() < 0.01);

        let mut all = before;
        all.extend(after);
        assert!(all.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(env.phase(), Phase::Attack);
    }

    #[test]
    fn shortening_release_mid_ramp_stays_in_range() {
        let mut env = Envelope::new(&ctx(), 0.001, 10.0);
        env.reset();
        levels(&mut env, 5);
        env.release();
        let before = levels(&mut env, 2000);
        env.set_release(0.1);
        let after = levels(&mut env, 200);

        let mut all = before;
        all.extend(after);
        assert!(all.windows(2).all(|w| w[1] <= w[0]));
        assert!(env.done());
    }

    #[test]
    fn lengthening_release_keeps_progress() {
        let mut env = Envelope::new(&ctx(), 0.001, 0.1);
        env.reset();
        levels(&mut env, 5);
        env.release();
        let before = levels(&mut env, 50);
        env.set_release(1.0);
        let after = levels(&mut env, 10);
        assert!((after[0] - 0.5).abs() < 0.01);

        let mut all = before;
        all.extend(after);
        assert!(all.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(env.phase(), Phase::Release);
    }
}
