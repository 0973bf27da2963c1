//! Session Simulator - deterministic sampler runs
//!
//! Drives a [`Sampler`] through scripted segments on a [`ManualClock`].
//! Frames and ticks are interleaved in timestamp order; at equal timestamps
//! the frame is observed before the tick.

use std::time::Duration;

use vigil_core::{AttentionConfig, LandmarkSet, Sample, SessionSummary, Timestamp};
use vigil_session::{Clock, LiveStats, ManualClock, Sampler};

use crate::FaceBuilder;

/// One stretch of a scripted session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Pose in front of the camera, `None` when nobody is there
    pub face: Option<FaceBuilder>,
    /// Host surface hidden for the whole segment
    pub hidden: bool,
    pub duration: Duration,
}

impl Segment {
    pub fn face(face: FaceBuilder, duration: Duration) -> Self {
        Segment {
            face: Some(face),
            hidden: false,
            duration,
        }
    }

    pub fn away(duration: Duration) -> Self {
        Segment {
            face: None,
            hidden: false,
            duration,
        }
    }

    /// Hidden surface with an attentive face still in view
    pub fn hidden(duration: Duration) -> Self {
        Segment {
            face: Some(FaceBuilder::attentive()),
            hidden: true,
            duration,
        }
    }
}

/// Sampler plus manual clock and frame cadence
pub struct SessionSimulator {
    sampler: Sampler,
    clock: ManualClock,
    frame_interval: Duration,
    tick_interval: Duration,
    next_frame: Timestamp,
    next_tick: Timestamp,
    frames: u64,
}

impl SessionSimulator {
    /// Simulator at 10 frames per second
    pub fn new(config: &AttentionConfig) -> Self {
        SessionSimulator {
            sampler: Sampler::new(config),
            clock: ManualClock::new(Timestamp::ZERO),
            frame_interval: Duration::from_millis(100),
            tick_interval: config.sampler.sample_interval.max(Duration::from_millis(1)),
            next_frame: Timestamp::ZERO,
            next_tick: Timestamp::ZERO,
            frames: 0,
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn start(&mut self) -> bool {
        let now = self.clock.now();
        let started = self.sampler.start(now);
        if started {
            self.next_frame = now + self.frame_interval;
            self.next_tick = now + self.tick_interval;
        }
        started
    }

    /// Play one segment. Returns the samples recorded during it.
    pub fn run(&mut self, segment: Segment) -> Vec<Sample> {
        let end = self.clock.now() + segment.duration;
        let mut recorded = Vec::new();

        loop {
            let next = self.next_frame.min(self.next_tick);
            if next > end {
                break;
            }
            self.clock.set(next);

            if self.next_frame <= self.next_tick {
                let landmarks = segment.face.map(|face| self.frame_of(face));
                self.sampler.observe(landmarks.as_ref(), next);
                self.next_frame = self.next_frame + self.frame_interval;
                self.frames += 1;
            } else {
                if let Some(sample) = self.sampler.tick(segment.hidden, next) {
                    recorded.push(sample);
                }
                self.next_tick = self.next_tick + self.tick_interval;
            }
        }

        self.clock.set(end);
        recorded
    }

    /// Play several segments back to back
    pub fn run_all(&mut self, segments: &[Segment]) -> Vec<Sample> {
        segments.iter().flat_map(|s| self.run(*s)).collect()
    }

    pub fn live(&self) -> Option<LiveStats> {
        self.sampler.live(self.clock.now())
    }

    pub fn stop(&mut self) -> Option<SessionSummary> {
        self.sampler.stop(self.clock.now())
    }

    fn frame_of(&self, face: FaceBuilder) -> LandmarkSet {
        if face.jitter > 0.0 {
            face.with_jitter(face.jitter, face.seed.wrapping_add(self.frames)).build()
        } else {
            face.build()
        }
    }
}
