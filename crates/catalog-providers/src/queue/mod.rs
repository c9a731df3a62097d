//! Message Queue Transports
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`AmqpConnector`] | Broker | AMQP 0-9-1 (RabbitMQ) through lapin |
//! | [`InMemoryBroker`] | In-process | Same durability, ack and redelivery rules, no network |

#[cfg(feature = "queue-amqp")]
pub mod amqp;
pub mod memory;

#[cfg(feature = "queue-amqp")]
pub use amqp::AmqpConnector;
pub use memory::InMemoryBroker;
