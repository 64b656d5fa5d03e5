//! A `Job` is one unit of dispatch work: a single popped message paired with
//! the receiver table as it stood when the job was built. The snapshot is an
//! owned copy, so registrations and removals after submission never change
//! where an in-flight job goes.

use crate::broker::message::Message;
use crate::broker::registry::Endpoints;

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub message: Message,
    pub destinations: Endpoints,
}
