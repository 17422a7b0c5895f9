/// Notify the configured settings webhook that the user's currency
/// preference changed. The webhook is informational: a failure warns and
/// the preference write stands either way.
pub fn notify_currency_change(url: &str, code: &str) {
    let body = serde_json::json!({ "currency": code }).to_string();

    let result = ureq::post(url)
        .header("content-type", "application/json")
        .send(body.as_bytes());

    if let Err(e) = result {
        eprintln!("Warning: currency webhook {url} failed: {e}");
    }
}
