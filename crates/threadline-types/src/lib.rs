pub mod pagination;
pub mod validation;

pub use pagination::{PageRequest, SortOrder, DEFAULT_PAGE_SIZE};
pub use validation::{
    CommentValidation, ThreadValidation, ValidationErrors, ValidationIssue, MIN_THREAD_LENGTH,
};
