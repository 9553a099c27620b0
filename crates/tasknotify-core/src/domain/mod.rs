//! Domain model (task records, normalized form, change events, errors).

pub mod ids;
pub mod task;
pub mod normalize;
pub mod change;
pub mod errors;

pub use ids::TaskId;
pub use task::{MultiValue, Task};
pub use normalize::{FieldValue, NormalizedTask, WatchedField, normalize};
pub use change::{ChangeEvent, ChangeKind, Editor, FieldDelta};
pub use errors::{MailError, StoreError};
