pub mod mic_source;
