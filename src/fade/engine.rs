use std::time::{Duration, Instant};

use super::signal::{FadeOutcome, FadeSignal};

/// Default frame cadence, roughly one display refresh.
pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

type TickFn<C> = Box<dyn FnMut(&mut C, f32)>;

struct ActiveFade<K, C> {
    key: K,
    from: f32,
    to: f32,
    duration: Duration,
    started_at: Instant,
    on_tick: TickFn<C>,
    signal: FadeSignal,
}

impl<K, C> ActiveFade<K, C> {
    /// Interpolated value at `now` and whether the fade is finished.
    fn sample(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started_at);
        let t = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        if t >= 1.0 {
            (self.to, true)
        } else {
            (self.from + (self.to - self.from) * t, false)
        }
    }
}

/// Drives any number of independent fades, one per key.
///
/// The frame loop is occupancy based: it is armed when the first fade starts
/// and torn down as soon as the last one finishes or is cancelled, so
/// [`next_frame`](Self::next_frame) is `None` whenever nothing is fading.
pub struct FadeEngine<K, C> {
    fades: Vec<ActiveFade<K, C>>,
    frame: Duration,
    next_frame: Option<Instant>,
}

impl<K: PartialEq + Clone, C> FadeEngine<K, C> {
    pub fn new(frame: Duration) -> Self {
        Self {
            fades: Vec::new(),
            frame: frame.max(Duration::from_millis(1)),
            next_frame: None,
        }
    }

    /// Start fading `key` from `from` to `to` over `duration`.
    ///
    /// An active fade for the same key is cancelled first. A zero duration
    /// delivers one tick at `to` right away and returns an already completed
    /// signal.
    pub fn start<F>(
        &mut self,
        key: K,
        from: f32,
        to: f32,
        duration: Duration,
        now: Instant,
        ctx: &mut C,
        on_tick: F,
    ) -> FadeSignal
    where
        F: FnMut(&mut C, f32) + 'static,
    {
        self.cancel(&key);

        let signal = FadeSignal::pending();
        if duration.is_zero() {
            let mut on_tick = on_tick;
            on_tick(ctx, to);
            signal.resolve(FadeOutcome::Completed);
            return signal;
        }

        self.fades.push(ActiveFade {
            key,
            from,
            to,
            duration,
            started_at: now,
            on_tick: Box::new(on_tick),
            signal: signal.clone(),
        });
        if self.next_frame.is_none() {
            self.next_frame = Some(now + self.frame);
        }
        signal
    }

    /// Advance every active fade to `now`.
    ///
    /// All fades receive their tick before any completion is reported. Returns
    /// the keys that completed during this frame, in start order.
    pub fn tick(&mut self, now: Instant, ctx: &mut C) -> Vec<K> {
        let mut finished = Vec::new();
        for (i, fade) in self.fades.iter_mut().enumerate() {
            let (value, done) = fade.sample(now);
            (fade.on_tick)(ctx, value);
            if done {
                finished.push(i);
            }
        }

        let mut completed = Vec::with_capacity(finished.len());
        for i in finished.into_iter().rev() {
            let fade = self.fades.remove(i);
            fade.signal.resolve(FadeOutcome::Completed);
            completed.push(fade.key);
        }
        completed.reverse();

        self.next_frame = if self.fades.is_empty() {
            None
        } else {
            Some(now + self.frame)
        };
        completed
    }

    /// Cancel the fade for `key`, if any. Returns whether one was active.
    pub fn cancel(&mut self, key: &K) -> bool {
        let Some(pos) = self.fades.iter().position(|f| &f.key == key) else {
            return false;
        };
        let fade = self.fades.remove(pos);
        fade.signal.resolve(FadeOutcome::Cancelled);
        if self.fades.is_empty() {
            self.next_frame = None;
        }
        true
    }

    pub fn cancel_all(&mut self) {
        for fade in self.fades.drain(..) {
            fade.signal.resolve(FadeOutcome::Cancelled);
        }
        self.next_frame = None;
    }

    /// Same as [`cancel_all`](Self::cancel_all); call before dropping the engine.
    pub fn destroy(&mut self) {
        self.cancel_all();
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.fades.iter().any(|f| &f.key == key)
    }

    pub fn is_running(&self) -> bool {
        self.next_frame.is_some()
    }

    /// When the frame loop wants its next tick, if it is running.
    pub fn next_frame(&self) -> Option<Instant> {
        self.next_frame
    }

    pub fn is_empty(&self) -> bool {
        self.fades.is_empty()
    }
}
