//! # speech-commands-cpal
//!
//! cpal microphone backend for the speech-commands plugin core.
//!
//! Provides:
//! - `CpalMicSource` — `MicSource` over the default or a named input device
//! - `list_input_devices` — input device name enumeration
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use speech_commands_core::{CaptureConfig, MethodCall, SpeechCommandsPlugin};
//! use speech_commands_cpal::CpalMicSource;
//!
//! let source = Arc::new(CpalMicSource::default_device());
//! let plugin = SpeechCommandsPlugin::new(CaptureConfig::default(), source)?;
//! plugin.handle(&MethodCall::new("record"));
//! ```

pub mod cpal_source;

pub use cpal_source::{list_input_devices, CpalMicSource};
