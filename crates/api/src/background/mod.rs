//! Background work triggered by delete requests.
//!
//! [`work_queue::InProcessWorkQueue`] hands work items to the
//! [`worker::run`] loop over a channel. The worker accepts a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) for graceful
//! shutdown.

pub mod work_queue;
pub mod worker;
