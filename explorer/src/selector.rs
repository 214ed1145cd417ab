use crate::client::PageSource;
use crate::context::{ContextKind, QueryContext, QueryInputs};
use catalog::types::{PageRequest, PageResult, Pokemon};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One issued page request. Only the most recently issued ticket may update
/// the selector; completions for older tickets are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTicket {
    pub request_id: u64,
    pub context: QueryContext,
    pub page: PageRequest,
}

#[derive(Clone, Debug, PartialEq)]
enum Status {
    Idle,
    Loading,
    Failed(String),
    Loaded(PageResult<Pokemon>),
}

/// Snapshot handed to the renderer. At most one of `loading`, `error` and
/// `data` is set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryView {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<PageResult<Pokemon>>,
    pub title: String,
    pub context: ContextKind,
    pub page: u32,
    pub page_count: Option<u32>,
    pub should_show_instructions: bool,
}

/// Selects exactly one active filter dimension from the user's inputs and
/// owns the page cursor for it.
pub struct UnifiedQuery {
    context: QueryContext,
    page: u32,
    page_size: u32,
    status: Status,
    issued: u64,
    latest: Option<u64>,
}

impl Default for UnifiedQuery {
    fn default() -> Self {
        UnifiedQuery::new(DEFAULT_PAGE_SIZE)
    }
}

impl UnifiedQuery {
    pub fn new(page_size: u32) -> Self {
        UnifiedQuery {
            context: QueryContext::Empty,
            page: 1,
            page_size: page_size.max(1),
            status: Status::Idle,
            issued: 0,
            latest: None,
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Re-resolves the active context. When the resolved dimension or value
    /// changed, the page cursor goes back to 1, results of the previous
    /// context are dropped and any in-flight request is orphaned.
    /// Returns whether the context changed.
    pub fn set_inputs(&mut self, inputs: &QueryInputs) -> bool {
        let resolved = QueryContext::resolve(inputs);
        if resolved == self.context {
            return false;
        }

        tracing::debug!(
            from = ?self.context.kind(),
            to = ?resolved.kind(),
            "Query context switched"
        );
        self.context = resolved;
        self.page = 1;
        self.status = Status::Idle;
        self.latest = None;
        true
    }

    /// Moves the cursor to `page` (1-based, values below 1 clamp to 1).
    /// Results of the previous page are dropped along with any in-flight
    /// request for it.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.status = Status::Idle;
            self.latest = None;
        }
    }

    fn page_request(&self) -> PageRequest {
        let offset = i64::from(self.page - 1) * i64::from(self.page_size);
        PageRequest::new(offset, i64::from(self.page_size))
    }

    /// Issues the request for the current context and page. `None` when no
    /// context is active.
    pub fn next_request(&mut self) -> Option<PageTicket> {
        if self.context.is_empty() {
            return None;
        }

        self.issued += 1;
        self.latest = Some(self.issued);
        self.status = Status::Loading;

        Some(PageTicket {
            request_id: self.issued,
            context: self.context.clone(),
            page: self.page_request(),
        })
    }

    /// Applies the outcome of `request_id`. Returns false, leaving the state
    /// untouched, when a newer request has been issued since.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        request_id: u64,
        result: Result<PageResult<Pokemon>, E>,
    ) -> bool {
        if self.latest != Some(request_id) {
            tracing::debug!(request_id, latest = ?self.latest, "Dropping stale page response");
            return false;
        }

        self.status = match result {
            Ok(page) => Status::Loaded(page),
            Err(e) => Status::Failed(e.to_string()),
        };
        true
    }

    /// Issues the next request against `source` and applies its result.
    pub async fn refresh(&mut self, source: &dyn PageSource) -> QueryView {
        if let Some(ticket) = self.next_request() {
            let result = source.fetch_page(&ticket.context, ticket.page).await;
            self.complete(ticket.request_id, result);
        }
        self.view()
    }

    pub fn page_count(&self) -> Option<u32> {
        match &self.status {
            Status::Loaded(page) => {
                let total = u32::try_from(page.total).unwrap_or(u32::MAX);
                Some(total.div_ceil(self.page_size).max(1))
            }
            _ => None,
        }
    }

    pub fn view(&self) -> QueryView {
        let (loading, error, data) = match &self.status {
            Status::Idle => (false, None, None),
            Status::Loading => (true, None, None),
            Status::Failed(message) => (false, Some(message.clone()), None),
            Status::Loaded(page) => (false, None, Some(page.clone())),
        };

        QueryView {
            loading,
            error,
            data,
            title: self.context.title(),
            context: self.context.kind(),
            page: self.page,
            page_count: self.page_count(),
            should_show_instructions: self.context.is_empty(),
        }
    }
}
