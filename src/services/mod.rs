pub mod dispatcher;
pub mod message_api;
pub mod scheduler;
pub mod shutdown;
pub mod sources;

pub use dispatcher::{Dispatcher, PassReport, Throttle};
pub use message_api::{MessageApiService, MessageSender};
pub use scheduler::{Campaign, PassScheduler};
pub use shutdown::{shutdown_channel, ShutdownToken, ShutdownTrigger};
pub use sources::{RowSource, SheetSource};
