/// Business logic layer
///
/// Services own the rules; repositories, image storage and the identity
/// provider are injected as trait objects.
pub mod comments;
pub mod posts;
pub mod slug;
pub mod storage;

pub use comments::{CommentInput, CommentService};
pub use posts::{Caller, PostService};
pub use storage::{ImageStore, LocalImageStore};
