//! Fetch stage: login, select, search, and retrieve raw messages.

use tracing::{debug, info, info_span, warn, Instrument};

use super::error::Result;
use super::search::{Limit, SearchFilter};
use super::source::{MailSource, RawMessage};

/// What to fetch from an authenticated session.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub mailbox: String,
    pub filter: SearchFilter,
    pub limit: Limit,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            mailbox: "INBOX".to_string(),
            filter: SearchFilter::All,
            limit: Limit::Unbounded,
        }
    }
}

/// Connects, fetches every message selected by `request`, and logs out.
///
/// Messages are returned in the order the server listed them. Once
/// `connect` succeeds, `disconnect` runs on every exit path; a fetch-stage
/// error is returned after the logout attempt.
pub async fn fetch_messages<S>(source: &mut S, request: &FetchRequest) -> Result<Vec<RawMessage>>
where
    S: MailSource + ?Sized,
{
    let span = info_span!("fetch", mailbox = %request.mailbox, filter = %request.filter);
    fetch_in_session(source, request).instrument(span).await
}

async fn fetch_in_session<S>(source: &mut S, request: &FetchRequest) -> Result<Vec<RawMessage>>
where
    S: MailSource + ?Sized,
{
    source.connect().await?;

    let fetched = fetch_selected(source, request).await;
    let logout = source.disconnect().await;

    match (fetched, logout) {
        (Ok(messages), Ok(())) => Ok(messages),
        (Ok(messages), Err(e)) => {
            warn!("Logout failed after a successful fetch: {}", e);
            Ok(messages)
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(logout_err)) => {
            warn!("Logout failed while handling an earlier error: {}", logout_err);
            Err(e)
        }
    }
}

async fn fetch_selected<S>(source: &mut S, request: &FetchRequest) -> Result<Vec<RawMessage>>
where
    S: MailSource + ?Sized,
{
    let exists = source.select_mailbox(&request.mailbox).await?;
    debug!("Mailbox '{}' selected ({} messages)", request.mailbox, exists);

    let seqs = source.search(&request.filter.query()).await?;
    info!("Search matched {} messages", seqs.len());

    if request.limit.is_negative() {
        warn!(
            "Negative limit: fetching {} of the search results",
            request.limit
        );
    }
    let selected = request.limit.apply(&seqs);

    let total = selected.len();
    let mut messages = Vec::with_capacity(total);
    for (index, seq) in selected.iter().enumerate() {
        info!("Fetching message {}/{} (seq {})", index + 1, total, seq);
        messages.push(source.fetch_rfc822(*seq).await?);
    }

    info!("Fetched {} messages", messages.len());
    Ok(messages)
}
