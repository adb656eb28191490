// src/model/mod.rs
//! Breath waveform synthesis
//!
//! [`template::WaveformTemplate`] holds one recorded reference cycle;
//! [`waveform::WaveformModel`] scales it to target rate/peak/PEEP and turns
//! it into an endless interpolated sample stream.

pub mod template;
pub mod waveform;

pub use template::{TemplateError, WaveformTemplate};
pub use waveform::{ModelError, WaveformModel};
