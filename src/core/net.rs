use std::fs;

use reqwest::RequestBuilder;
use tracing::{debug, warn};

use crate::core::{EtfError, JustEtfClient};

/// Send a request and read the body as text.
///
/// Non-2xx statuses become [`EtfError::Status`]. When the client has a debug
/// directory, the body is also saved there as `dump_name`.
pub(crate) async fn fetch_text(
    client: &JustEtfClient,
    req: RequestBuilder,
    dump_name: &str,
) -> Result<String, EtfError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(EtfError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        });
    }
    get_text(client, resp, dump_name).await
}

/// Read the response body as text, dumping it when a debug directory is set.
pub(crate) async fn get_text(
    client: &JustEtfClient,
    resp: reqwest::Response,
    dump_name: &str,
) -> Result<String, EtfError> {
    let text = resp.text().await?;

    if let Some(dir) = client.debug_dir() {
        let path = dir.join(dump_name);
        match fs::create_dir_all(dir).and_then(|()| fs::write(&path, &text)) {
            Ok(()) => debug!(path = %path.display(), "dumped response body"),
            Err(e) => warn!(path = %path.display(), "failed to dump response body: {e}"),
        }
    }

    Ok(text)
}
