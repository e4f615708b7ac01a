//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskist::Error;
use taskist::config::{SttConfig, TtsConfig};
use taskist::voice::{
    CaptureController, CaptureState, CapturedAudio, HttpSpeechToText, HttpTextToSpeech,
    SAMPLE_RATE, SpeechToText, SttProvider, TextToSpeech, TtsProvider, samples_to_wav,
};

mod common;

use common::{FLUSH_SAMPLE, LIVE_SAMPLE, ScriptedSource, SourceMode};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

fn sine_recording() -> CapturedAudio {
    CapturedAudio {
        samples: generate_sine_samples(440.0, 0.2, 0.3),
        sample_rate: SAMPLE_RATE,
    }
}

fn key(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn controller(mode: SourceMode) -> CaptureController {
    CaptureController::new(Arc::new(ScriptedSource::new(mode)))
}

// ── WAV encoding ──────────────────────────────────────────────────

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn test_recording_encodes_at_speech_rate() {
    let audio = CapturedAudio {
        samples: vec![0.25; 48_000],
        sample_rate: 48_000,
    };
    assert!((audio.duration_secs() - 1.0).abs() < f32::EPSILON);

    let wav_data = audio.to_wav().unwrap();
    let reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), SAMPLE_RATE);
}

// ── Capture lifecycle ─────────────────────────────────────────────

#[tokio::test]
async fn test_capture_includes_flushed_frames() {
    let mut capture = controller(SourceMode::Frames);
    assert_eq!(capture.state(), CaptureState::Idle);

    capture.start_capture().unwrap();
    assert_eq!(capture.state(), CaptureState::Recording);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_ok!(capture.signal_stop().await);
    assert_eq!(capture.state(), CaptureState::Stopped);

    let audio = capture.take_audio().unwrap();
    assert_eq!(audio.sample_rate, SAMPLE_RATE);
    assert!(audio.samples.iter().any(|&s| (s - LIVE_SAMPLE).abs() < f32::EPSILON));
    let tail = &audio.samples[audio.samples.len() - 80..];
    assert!(tail.iter().all(|&s| (s - FLUSH_SAMPLE).abs() < f32::EPSILON));
    assert_eq!(capture.state(), CaptureState::Idle);
}

#[tokio::test]
async fn test_no_audio_before_stop() {
    let mut capture = controller(SourceMode::Frames);
    assert!(capture.take_audio().is_none());

    capture.start_capture().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(capture.take_audio().is_none());
    assert_eq!(capture.state(), CaptureState::Recording);

    capture.signal_stop().await.unwrap();
    assert!(capture.take_audio().is_some());
    // Taken once, then gone
    assert!(capture.take_audio().is_none());
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let mut capture = controller(SourceMode::Frames);
    capture.start_capture().unwrap();

    assert!(matches!(capture.start_capture(), Err(Error::AlreadyCapturing)));
    assert_eq!(capture.state(), CaptureState::Recording);

    capture.signal_stop().await.unwrap();
    assert!(!capture.take_audio().unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_while_idle_is_noop() {
    let mut capture = controller(SourceMode::Frames);
    assert_ok!(capture.signal_stop().await);
    assert_eq!(capture.state(), CaptureState::Idle);
    assert!(capture.take_audio().is_none());
}

#[tokio::test]
async fn test_stop_token_ends_recording() {
    let mut capture = controller(SourceMode::Frames);
    assert!(capture.stop_token().is_none());

    capture.start_capture().unwrap();
    let token = capture.stop_token().unwrap();
    token.cancel();

    capture.signal_stop().await.unwrap();
    let audio = capture.take_audio().unwrap();
    assert!(audio.samples.len() >= 80);
}

#[tokio::test]
async fn test_source_failure_surfaces_on_stop() {
    let mut capture = controller(SourceMode::Broken);
    capture.start_capture().unwrap();

    let result = capture.signal_stop().await;
    assert!(matches!(result, Err(Error::Audio(msg)) if msg.contains("device unplugged")));
    assert_eq!(capture.state(), CaptureState::Idle);
    assert!(capture.take_audio().is_none());

    // A new recording can start after the failure
    assert_ok!(capture.start_capture());
}

// ── Speech-to-text ────────────────────────────────────────────────

fn stt_config(provider: SttProvider, server: &MockServer) -> SttConfig {
    SttConfig {
        provider,
        model: provider.default_model().to_string(),
        base_url: Some(server.uri()),
        ..SttConfig::default()
    }
}

#[tokio::test]
async fn test_groq_whisper_transcription() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer gsk-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": " add eggs "})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stt = HttpSpeechToText::new(&stt_config(SttProvider::Groq, &server), &key("gsk-test"))
        .unwrap();

    let transcript = stt.transcribe(&sine_recording()).await.unwrap();
    assert_eq!(transcript, "add eggs");
}

#[tokio::test]
async fn test_deepgram_transcription() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listen"))
        .and(query_param("model", "nova-2"))
        .and(header("authorization", "Token dg-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": {
                "channels": [
                    {"alternatives": [{"transcript": "remove milk", "confidence": 0.98}]}
                ]
            }
        })))
        .mount(&server)
        .await;

    let stt =
        HttpSpeechToText::new(&stt_config(SttProvider::Deepgram, &server), &key("dg-test"))
            .unwrap();

    assert_eq!(stt.transcribe(&sine_recording()).await.unwrap(), "remove milk");
}

#[tokio::test]
async fn test_stt_error_status_is_transcription_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let stt = HttpSpeechToText::new(&stt_config(SttProvider::OpenAi, &server), &key("sk-bad"))
        .unwrap();

    let result = stt.transcribe(&sine_recording()).await;
    assert!(matches!(result, Err(Error::TranscriptionFailed(msg)) if msg.contains("401")));
}

#[tokio::test]
async fn test_stt_request_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"text": "too late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = SttConfig {
        timeout: Duration::from_millis(100),
        ..stt_config(SttProvider::Groq, &server)
    };
    let stt = HttpSpeechToText::new(&config, &key("gsk-test")).unwrap();

    let result = stt.transcribe(&sine_recording()).await;
    assert!(matches!(result, Err(Error::TranscriptionFailed(_))));
}

// ── Text-to-speech ────────────────────────────────────────────────

fn tts_config(provider: TtsProvider, server: &MockServer) -> TtsConfig {
    TtsConfig {
        provider,
        voice: provider.default_voice().to_string(),
        model: provider.default_model().to_string(),
        output_format: provider.default_output_format().to_string(),
        base_url: Some(server.uri()),
        ..TtsConfig::default()
    }
}

#[tokio::test]
async fn test_elevenlabs_synthesis() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/text-to-speech/Xb7hH8MSUJpSbSDYk0k2"))
        .and(query_param("output_format", "mp3_22050_32"))
        .and(header("xi-api-key", "el-test"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake-mp3".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tts = HttpTextToSpeech::new(&tts_config(TtsProvider::ElevenLabs, &server), &key("el-test"))
        .unwrap();

    let audio = tts.synthesize("Added 'eggs' to your list.").await.unwrap();
    assert_eq!(audio.bytes(), b"ID3fake-mp3");
}

#[tokio::test]
async fn test_openai_synthesis() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90]))
        .mount(&server)
        .await;

    let tts =
        HttpTextToSpeech::new(&tts_config(TtsProvider::OpenAi, &server), &key("sk-test")).unwrap();

    let audio = tts.synthesize("Your list is empty.").await.unwrap();
    assert_eq!(audio.bytes(), &[0xFF, 0xFB, 0x90]);
}

#[tokio::test]
async fn test_tts_failures_are_synthesis_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/text-to-speech/Xb7hH8MSUJpSbSDYk0k2"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let openai =
        HttpTextToSpeech::new(&tts_config(TtsProvider::OpenAi, &server), &key("sk-test")).unwrap();
    assert!(matches!(
        openai.synthesize("hello").await,
        Err(Error::SynthesisFailed(msg)) if msg.contains("no audio")
    ));

    let elevenlabs =
        HttpTextToSpeech::new(&tts_config(TtsProvider::ElevenLabs, &server), &key("el-test"))
            .unwrap();
    assert!(matches!(
        elevenlabs.synthesize("hello").await,
        Err(Error::SynthesisFailed(msg)) if msg.contains("429")
    ));
}

#[test]
fn test_empty_api_key_is_config_error() {
    let result = HttpTextToSpeech::new(&TtsConfig::default(), &key(""));
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("ELEVENLABS_API_KEY")));
}
