use url::Url;

use crate::{ApiError, FailureKind};

/// Parses the configured base URL. A trailing path is kept as a prefix.
pub(crate) fn parse_base(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url.trim())
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::new(
            FailureKind::InvalidUrl,
            format!("{base_url} cannot be used as a base url"),
        ));
    }
    Ok(url)
}

/// `base` + percent-encoded `segments` + encoded `query` pairs.
pub(crate) fn endpoint(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_segments_onto_base() {
        let base = parse_base("http://localhost:9200").unwrap();
        assert_eq!(
            endpoint(&base, &["collections"], &[]).as_str(),
            "http://localhost:9200/collections"
        );
        let prefixed = parse_base("https://host.example/api/").unwrap();
        assert_eq!(
            endpoint(&prefixed, &["auth", "login"], &[]).as_str(),
            "https://host.example/api/auth/login"
        );
    }

    #[test]
    fn collection_names_stay_one_segment() {
        let base = parse_base("http://localhost:9200").unwrap();
        let url = endpoint(&base, &["collections", "a/b c"], &[]);
        assert_eq!(url.as_str(), "http://localhost:9200/collections/a%2Fb%20c");
    }

    #[test]
    fn query_values_are_encoded() {
        let base = parse_base("http://localhost:9200").unwrap();
        let url = endpoint(
            &base,
            &["download"],
            &[("tag", "q1&q2"), ("collection", "east side")],
        );
        assert_eq!(
            url.as_str(),
            "http://localhost:9200/download?tag=q1%26q2&collection=east+side"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert_eq!(
            parse_base("mailto:ops@example.com").unwrap_err().kind,
            FailureKind::InvalidUrl
        );
        assert_eq!(parse_base("not a url").unwrap_err().kind, FailureKind::InvalidUrl);
    }
}
