use serde::{Deserialize, Serialize};
use threadline_types::{PageRequest, SortOrder};

/// Filter shared by the page query and the total count
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserFilter {
    /// Auth id that must not appear in the results
    pub exclude_auth_id: String,
    /// Escaped regular expression matched case-insensitively against username or name
    pub pattern: Option<String>,
}

impl UserFilter {
    /// Blank search text matches everyone but the requester
    pub fn new(exclude_auth_id: impl Into<String>, search: &str) -> Self {
        let pattern = if search.trim().is_empty() {
            None
        } else {
            Some(regex::escape(search))
        };
        Self {
            exclude_auth_id: exclude_auth_id.into(),
            pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub filter: UserFilter,
    pub sort: SortOrder,
    pub skip: u64,
    pub limit: u64,
}

/// Paginated user search on behalf of `auth_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearch {
    pub auth_id: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub page: PageRequest,
    #[serde(default)]
    pub sort: SortOrder,
}

impl UserSearch {
    pub fn new(auth_id: impl Into<String>) -> Self {
        Self {
            auth_id: auth_id.into(),
            search: String::new(),
            page: PageRequest::default(),
            sort: SortOrder::default(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_page(mut self, page_number: u64, page_size: u64) -> Self {
        self.page = PageRequest::new(page_number, page_size);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub(crate) fn to_query(&self) -> UserQuery {
        UserQuery {
            filter: UserFilter::new(self.auth_id.clone(), &self.search),
            sort: self.sort,
            skip: self.page.skip(),
            limit: self.page.limit(),
        }
    }
}
