//! Domain events

/// Product change events announced on the product queue
pub mod change_event;
/// Publishing port for change events
pub mod publisher;

pub use change_event::ChangeEvent;
pub use publisher::EventPublisher;
