// Take export - offline rendering of a recorded performance
//
// The live sound comes from an external synth, so a WAV export renders the
// captured notes again with a plain sine voice.

use crate::recorder::RecorderError;
use crate::recorder::take::{MAX_TAKE_DURATION_MS, NoteSpan, Take};
use hound::{WavSpec, WavWriter};
use std::f32::consts::TAU;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// 16-bit mono WAV rendered from the take
    Wav,
    /// The take's event list as a JSON document
    Json,
}

impl ExportFormat {
    /// Pick a format from a destination path, WAV unless it ends in `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Wav,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub sample_rate: u32,
    pub attack_ms: f32,
    pub release_ms: f32,
    /// Peak level of a velocity 127 note before soft clipping
    pub voice_gain: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            attack_ms: 5.0,
            release_ms: 120.0,
            voice_gain: 0.25,
        }
    }
}

pub fn midi_to_frequency(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

fn ms_to_samples(ms: u64, sample_rate: u32) -> Option<usize> {
    let samples = ms.checked_mul(u64::from(sample_rate))? / 1000;
    usize::try_from(samples).ok()
}

/// Render a take to mono samples in `[-1, 1]`.
///
/// Takes longer than [`MAX_TAKE_DURATION_MS`] are refused before anything is allocated.
pub fn render_take(take: &Take, settings: &RenderSettings) -> Result<Vec<f32>, RecorderError> {
    let too_long = || RecorderError::TakeTooLong {
        duration_ms: take.duration_ms,
    };
    if take.duration_ms > MAX_TAKE_DURATION_MS {
        return Err(too_long());
    }

    let sr = settings.sample_rate as f32;
    let release = (settings.release_ms * sr / 1000.0) as usize;
    let attack = ((settings.attack_ms * sr / 1000.0) as usize).max(1);
    let total = ms_to_samples(take.duration_ms, settings.sample_rate)
        .and_then(|length| length.checked_add(release))
        .ok_or_else(too_long)?;
    let mut buffer = vec![0.0f32; total];

    for NoteSpan {
        note,
        velocity,
        start_ms,
        end_ms,
    } in take.note_spans()
    {
        // spans starting past the end have nothing to render
        let Some(start) = ms_to_samples(start_ms, settings.sample_rate).filter(|s| *s < total)
        else {
            continue;
        };
        let held = ms_to_samples(end_ms.saturating_sub(start_ms), settings.sample_rate)
            .unwrap_or(usize::MAX);
        let amplitude = settings.voice_gain * velocity as f32 / 127.0;
        let phase_step = TAU * midi_to_frequency(note) / sr;

        for (i, slot) in buffer[start..]
            .iter_mut()
            .take(held.saturating_add(release))
            .enumerate()
        {
            let attack_gain = (i as f32 / attack as f32).min(1.0);
            let release_gain = if i < held {
                1.0
            } else {
                1.0 - (i - held) as f32 / release.max(1) as f32
            };
            *slot += amplitude * attack_gain * release_gain * (phase_step * i as f32).sin();
        }
    }

    for sample in &mut buffer {
        *sample = sample.tanh();
    }
    Ok(buffer)
}

pub(crate) fn write_wav(
    take: &Take,
    settings: &RenderSettings,
    dest: &Path,
) -> Result<(), RecorderError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: settings.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let samples = render_take(take, settings)?;
    let mut writer = WavWriter::create(dest, spec)?;
    for sample in samples {
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

pub(crate) fn write_json(take: &Take, dest: &Path) -> Result<(), RecorderError> {
    let json = serde_json::to_string_pretty(take)?;
    std::fs::write(dest, json)?;
    Ok(())
}
