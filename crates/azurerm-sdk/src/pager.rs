use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ArmClient, RequestOptions};
use crate::error::ArmResult;

/// One page of an ARM list operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

/// Run a list operation and follow `nextLink` until the last page.
///
/// Follow-up pages are requested with the same method as the first one,
/// which matters for POST-based lists such as `listKeys`.
pub async fn list_all<T: DeserializeOwned>(client: &ArmClient, request: RequestOptions<'_>) -> ArmResult<Vec<T>> {
    let operation = request.operation;
    let method = request.method.clone();
    let expected = request.expected_status_codes;
    let first = client.execute(request).await?;
    let mut page: Page<T> = first.json(operation)?;
    let mut items = std::mem::take(&mut page.value);

    while let Some(next) = page.next_link.take().filter(|l| !l.is_empty()) {
        debug!(next_link = %next, "fetching next page");
        // nextLink already carries api-version and the skip token.
        let url = client.url_for(operation, &next)?;
        let response = client.send_url(operation, method.clone(), url, None, expected).await?;
        page = response.json(operation)?;
        items.append(&mut page.value);
    }

    Ok(items)
}
