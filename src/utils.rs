use url::Url;

/// Turn a company name into a filename stem: `"Acme Corp."` -> `"acme_corp"`
pub fn sanitize_company_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    kept.trim().replace(' ', "_").to_lowercase()
}

/// Derive a display name from a site URL: `https://www.huggingface.co` -> `Huggingface`
///
/// Takes the first host label after dropping a leading `www.`.
pub fn company_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().filter(|label| !label.is_empty())?;

    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
