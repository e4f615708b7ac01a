//! Voice processing module
//!
//! Handles audio capture, speech-to-text, text-to-speech and playback.
//! Each external collaborator sits behind a trait so sessions can run
//! against scripted implementations.

mod capture;
mod microphone;
mod playback;
mod resample;
mod stt;
mod tts;

pub use capture::{
    AudioSource, CaptureController, CaptureState, CapturedAudio, SAMPLE_RATE, samples_to_wav,
};
pub use microphone::CpalMicrophone;
pub use playback::{AudioPlayback, AudioSink};
pub use resample::{resample, to_mono};
pub use stt::{HttpSpeechToText, SpeechToText, SttProvider};
pub use tts::{HttpTextToSpeech, SpeechAudio, TextToSpeech, TtsProvider};
