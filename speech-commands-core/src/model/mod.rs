pub mod loader;

pub use loader::{load_model, InferenceHandle};
