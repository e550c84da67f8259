//! Queue communication with the spreadsheet worker.
//!
//! Wire envelopes, the correlator that bridges async queue exchanges into
//! bounded synchronous calls, and the adapter binding the transport traits
//! to `shared-bus`.

pub mod bus_adapter;
pub mod handler;
pub mod requests;
pub mod responses;

pub use bus_adapter::{QueueResultReceiver, QueueWorkSender, ResultRouter};
pub use handler::{JobCorrelator, ResultListener, ResultReceiver, TransportError, WorkSender};
pub use requests::{JobSpec, WorkOrder};
pub use responses::{DailyRecap, WorkOutcome};
