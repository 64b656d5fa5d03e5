pub mod dispatch;
pub mod engine;
pub mod job;
pub mod message;
pub mod queue;
pub mod registry;
pub mod worker;

pub use engine::{Broker, BrokerRuntime, BrokerStats};
pub use job::{Job, JobId};
pub use message::Message;
pub use queue::MessageQueue;
pub use registry::{Connection, ConnectionId, ConnectionRegistry, Endpoints, Role};
