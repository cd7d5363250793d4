mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::{Repository, UserRepository};
pub use types::{Entity, PageRequest, DEFAULT_PAGE_LIMIT};
