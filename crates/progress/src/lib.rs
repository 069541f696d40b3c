pub mod event;
pub mod publisher;
pub mod stage;

pub use event::ProgressEvent;
pub use publisher::{NoopProgressPublisher, ProgressPublisher, RecordingProgressPublisher};
pub use stage::Stage;

#[cfg(test)]
mod tests;
