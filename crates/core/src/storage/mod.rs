mod error;
mod http_mapping;
mod traits;
mod types;

pub use error::{PaginationError, RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use traits::{
    image_mutation, patch_mutation, BookMutation, BookRepository, BookStore, UserStore,
};
pub use types::{Pagination, DEFAULT_PAGE_SIZE};
