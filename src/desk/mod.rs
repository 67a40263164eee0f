//! Client-side components: the user's submission form and the operator's
//! moderation queue. Both talk to the processing service through
//! [`ProcessingService`](crate::http::ProcessingService) and report through a
//! [`Notifier`].

pub mod error;
pub mod moderation;
pub mod notice;
pub mod submission;
pub mod summary;

pub use error::{DeskError, ValidationError};
pub use moderation::{ModerationDesk, RefreshOutcome, SessionState, Updated};
pub use notice::{Notice, Notifier, TracingNotifier};
pub use submission::{Accepted, SubmissionDesk, UserProfile, WithdrawalDraft};
pub use summary::{Bucket, StatusSummary};
