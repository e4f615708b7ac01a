//! Sample-rate and channel conversion

use crate::{Error, Result};

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resample mono audio using rubato
///
/// The final partial chunk is zero-padded so no input is dropped; output is
/// trimmed back to the expected length.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{FftFixedIn, Resampler};

    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedIn::<f64>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, SUB_CHUNKS, 1)
            .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;

    // The resampler may round the chunk size up to fit its FFT
    let chunk_size = resampler.input_frames_next();

    let mut output = Vec::new();
    for chunk in samples.chunks(chunk_size) {
        let mut input: Vec<f64> = chunk.iter().map(|&s| f64::from(s)).collect();
        input.resize(chunk_size, 0.0);

        let result = resampler
            .process(&[input], None)
            .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
        output.extend(result[0].iter().map(|&s| s as f32));
    }

    let expected = (samples.len() as f64 * f64::from(to_rate) / f64::from(from_rate)) as usize;
    output.truncate(expected);
    Ok(output)
}

/// Average interleaved channels down to mono
#[allow(clippy::cast_precision_loss)]
pub fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let ch = usize::from(channels.max(1));
    if ch == 1 {
        return data.to_vec();
    }

    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}
