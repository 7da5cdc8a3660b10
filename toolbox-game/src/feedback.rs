//! Audio and speech feedback as injected side effects.
//!
//! The engine never synthesizes sound. It describes tones and utterances and
//! hands them to a [`Feedback`] implementation owned by the host.
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::{DEFAULT_VOLUME, SPEECH_LANG, SPEECH_PITCH, SPEECH_RATE};
use crate::numbers::{clamp_unit_f32, millis_to_secs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One synthesized note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
    pub waveform: Waveform,
    /// Offset from the start of the cue.
    pub delay_ms: u32,
    pub volume: f32,
}

impl Tone {
    #[must_use]
    pub const fn new(frequency_hz: f32, duration_ms: u32, waveform: Waveform) -> Self {
        Self {
            frequency_hz,
            duration_ms,
            waveform,
            delay_ms: 0,
            volume: DEFAULT_VOLUME,
        }
    }

    #[must_use]
    pub const fn delayed(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub const fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    #[must_use]
    pub fn duration_secs(&self) -> f32 {
        millis_to_secs(self.duration_ms)
    }

    #[must_use]
    pub fn delay_secs(&self) -> f32 {
        millis_to_secs(self.delay_ms)
    }
}

/// Named sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Milestone reached or something unlocked.
    Ding,
    /// Sticker placed on the box.
    Clink,
    /// A new active day.
    Dawn,
}

impl Cue {
    /// The notes that make up this cue, at `volume`.
    #[must_use]
    pub fn tones(self, volume: f32) -> SmallVec<[Tone; 3]> {
        let volume = clamp_unit_f32(volume);
        let tones: SmallVec<[Tone; 3]> = match self {
            Self::Ding => smallvec![
                Tone::new(880.0, 120, Waveform::Triangle),
                Tone::new(1320.0, 80, Waveform::Sine),
            ],
            Self::Clink => smallvec![
                Tone::new(600.0, 60, Waveform::Square),
                Tone::new(900.0, 50, Waveform::Triangle),
            ],
            Self::Dawn => smallvec![
                Tone::new(523.25, 180, Waveform::Sine),
                Tone::new(659.25, 180, Waveform::Sine).delayed(140),
                Tone::new(783.99, 220, Waveform::Sine).delayed(280),
            ],
        };
        tones.into_iter().map(|t| t.with_volume(volume)).collect()
    }
}

/// Text to read aloud with fixed voice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub lang: String,
}

impl Utterance {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: SPEECH_RATE,
            pitch: SPEECH_PITCH,
            lang: SPEECH_LANG.to_string(),
        }
    }
}

/// Caller-controlled sound toggle and master volume.
///
/// Disabling sound silences tones only; speech is still delivered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    pub enabled: bool,
    volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SoundSettings {
    #[must_use]
    pub fn new(enabled: bool, volume: f32) -> Self {
        Self {
            enabled,
            volume: clamp_unit_f32(volume),
        }
    }

    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_unit_f32(volume);
    }
}

/// Sink for speech and sound side effects.
///
/// Implementations must not fail: an unavailable speech or audio backend
/// simply does nothing.
pub trait Feedback {
    fn speak(&mut self, utterance: &Utterance);

    fn tone(&mut self, tone: &Tone);

    /// Current sound settings; defaults to enabled at the standard volume.
    fn sound_settings(&self) -> SoundSettings {
        SoundSettings::default()
    }

    /// Play a named cue. The default expands it into tones.
    fn cue(&mut self, cue: Cue) {
        let settings = self.sound_settings();
        if !settings.enabled {
            return;
        }
        for tone in cue.tones(settings.volume()) {
            self.tone(&tone);
        }
    }
}

/// Feedback backend that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn speak(&mut self, _utterance: &Utterance) {}

    fn tone(&mut self, _tone: &Tone) {}

    fn cue(&mut self, _cue: Cue) {}
}

/// A call received by [`RecordingFeedback`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
    Spoke(Utterance),
    Tone(Tone),
    Cue(Cue),
}

/// Feedback backend that records every call; clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    settings: SoundSettings,
    log: Rc<RefCell<Vec<FeedbackEvent>>>,
}

impl RecordingFeedback {
    #[must_use]
    pub fn new(settings: SoundSettings) -> Self {
        Self {
            settings,
            log: Rc::default(),
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.log.borrow().clone()
    }

    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                FeedbackEvent::Cue(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                FeedbackEvent::Spoke(u) => Some(u.text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn set_settings(&mut self, settings: SoundSettings) {
        self.settings = settings;
    }
}

impl Feedback for RecordingFeedback {
    fn speak(&mut self, utterance: &Utterance) {
        self.log
            .borrow_mut()
            .push(FeedbackEvent::Spoke(utterance.clone()));
    }

    fn tone(&mut self, tone: &Tone) {
        self.log.borrow_mut().push(FeedbackEvent::Tone(*tone));
    }

    fn sound_settings(&self) -> SoundSettings {
        self.settings
    }

    fn cue(&mut self, cue: Cue) {
        self.log.borrow_mut().push(FeedbackEvent::Cue(cue));
        let settings = self.settings;
        if !settings.enabled {
            return;
        }
        for tone in cue.tones(settings.volume()) {
            self.tone(&tone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_tone_tables() {
        let ding = Cue::Ding.tones(0.3);
        assert_eq!(ding.len(), 2);
        assert!((ding[0].frequency_hz - 880.0).abs() < f32::EPSILON);
        assert_eq!(ding[0].waveform, Waveform::Triangle);
        assert_eq!(ding[0].duration_ms, 120);
        assert!((ding[1].frequency_hz - 1320.0).abs() < f32::EPSILON);
        assert_eq!(ding[1].waveform, Waveform::Sine);

        let clink = Cue::Clink.tones(0.3);
        assert_eq!(clink[0].waveform, Waveform::Square);
        assert_eq!(clink[1].duration_ms, 50);

        let dawn = Cue::Dawn.tones(0.3);
        let delays: Vec<_> = dawn.iter().map(|t| t.delay_ms).collect();
        assert_eq!(delays, [0, 140, 280]);
        assert!((dawn[2].duration_secs() - 0.22).abs() < 1e-6);
        assert!((dawn[1].delay_secs() - 0.14).abs() < 1e-6);
    }

    #[test]
    fn volume_is_clamped_into_unit_range() {
        let loud = Cue::Ding.tones(4.0);
        assert!(loud.iter().all(|t| (t.volume - 1.0).abs() < f32::EPSILON));
        let mut settings = SoundSettings::new(true, -1.0);
        assert!(settings.volume().abs() < f32::EPSILON);
        settings.set_volume(0.5);
        assert!((settings.volume() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn utterance_uses_fixed_voice() {
        let u = Utterance::new("Hello builder");
        assert!((u.rate - 0.95).abs() < f32::EPSILON);
        assert!((u.pitch - 1.05).abs() < f32::EPSILON);
        assert_eq!(u.lang, "en-US");
    }

    #[test]
    fn disabled_sound_still_speaks() {
        let mut feedback = RecordingFeedback::new(SoundSettings::new(false, 0.3));
        feedback.cue(Cue::Clink);
        feedback.speak(&Utterance::new("still here"));
        let events = feedback.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], FeedbackEvent::Cue(Cue::Clink));
        assert_eq!(feedback.spoken(), vec!["still here"]);
    }

    #[test]
    fn recording_clones_share_one_log() {
        let feedback = RecordingFeedback::default();
        let mut handle = feedback.clone();
        handle.cue(Cue::Dawn);
        assert_eq!(feedback.cues(), vec![Cue::Dawn]);
        // cue + three tones
        assert_eq!(feedback.events().len(), 4);
        feedback.clear();
        assert!(feedback.events().is_empty());
    }
}
