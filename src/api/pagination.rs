//! Cursor pagination driven by the `Link` response header.

use url::Url;

use crate::api::id::Id;
use crate::api::client::Params;

/// Page cursor. Passed `&mut` into list endpoints; the transport overwrites it from the
/// response so the next call fetches the next page.
///
/// A `max_id` of `None` asks for the first page; `None` after a call means there is no
/// further page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub max_id: Option<Id>,
    pub min_id: Option<Id>,
    pub since_id: Option<Id>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// True once a call came back without a `rel="next"` link.
    pub fn is_last_page(&self) -> bool {
        self.max_id.as_ref().map_or(true, Id::is_empty)
    }

    /// Append the non-empty cursor fields to a query.
    pub(crate) fn append_to(&self, params: &mut Params) {
        let fields = [
            ("max_id", &self.max_id),
            ("min_id", &self.min_id),
            ("since_id", &self.since_id),
        ];
        for (key, value) in fields {
            if let Some(id) = value.as_ref().filter(|id| !id.is_empty()) {
                params.add(key, id.as_str());
            }
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.add("limit", limit.to_string());
        }
    }

    /// Replace the cursor with the one carried by a `Link` header. `limit` is kept.
    pub(crate) fn update_from_link(&mut self, header: Option<&str>) {
        self.max_id = None;
        self.min_id = None;
        self.since_id = None;
        let Some(header) = header else {
            return;
        };
        for link in parse_link_header(header) {
            match link.rel.as_str() {
                "next" => self.max_id = query_id(&link.uri, "max_id"),
                "prev" => {
                    if let Some(min_id) = query_id(&link.uri, "min_id") {
                        self.min_id = Some(min_id);
                    }
                    if let Some(since_id) = query_id(&link.uri, "since_id") {
                        self.since_id = Some(since_id);
                    }
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub uri: String,
    pub rel: String,
}

/// Parse an RFC 5988 `Link` header value.
///
/// Links are split on commas outside `<...>`; each segment yields its bracketed URI and
/// its `rel` parameter. Segments without a URI are skipped.
pub(crate) fn parse_link_header(header: &str) -> Vec<Link> {
    split_outside_brackets(header)
        .into_iter()
        .filter_map(|segment| {
            let segment = segment.trim();
            let start = segment.find('<')?;
            let end = start + segment[start..].find('>')?;
            let uri = segment[start + 1..end].trim().to_string();
            let rel = segment[end + 1..]
                .split(';')
                .filter_map(|param| param.split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
                .map(|(_, value)| value.trim().trim_matches('"').to_string())
                .unwrap_or_default();
            Some(Link { uri, rel })
        })
        .collect()
}

fn split_outside_brackets(header: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&header[start..]);
    segments
}

fn query_id(uri: &str, key: &str) -> Option<Id> {
    let url = Url::parse(uri).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| Id::from(v.into_owned()))
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_prev_links_fill_cursor() {
        let mut pg = Pagination::default();
        pg.update_from_link(Some(
            r#"<https://x/?max_id=891>; rel="next", <https://x/?since_id=900>; rel="prev""#,
        ));
        assert_eq!(pg.max_id, Some(Id::from("891")));
        assert_eq!(pg.since_id, Some(Id::from("900")));
        assert_eq!(pg.min_id, None);
    }

    #[test]
    fn prev_link_with_min_id() {
        let mut pg = Pagination::default();
        pg.update_from_link(Some(
            r#"<https://x/api/v1/timelines/home?limit=20&max_id=10>; rel="next", <https://x/api/v1/timelines/home?limit=20&min_id=42>; rel="prev""#,
        ));
        assert_eq!(pg.max_id, Some(Id::from("10")));
        assert_eq!(pg.min_id, Some(Id::from("42")));
        assert_eq!(pg.since_id, None);
    }

    #[test]
    fn missing_header_clears_cursor_but_keeps_limit() {
        let mut pg = Pagination {
            max_id: Some(Id::from("5")),
            min_id: Some(Id::from("6")),
            since_id: Some(Id::from("7")),
            limit: Some(40),
        };
        pg.update_from_link(None);
        assert_eq!(pg, Pagination::with_limit(40));
        assert!(pg.is_last_page());
    }

    #[test]
    fn commas_inside_brackets_do_not_split() {
        let links = parse_link_header(r#"<https://x/?a=1,2&max_id=3>; rel="next""#);
        assert_eq!(
            links,
            vec![Link {
                uri: "https://x/?a=1,2&max_id=3".into(),
                rel: "next".into()
            }]
        );
    }

    #[test]
    fn unquoted_rel_is_accepted() {
        let links = parse_link_header("<https://x/?max_id=3>; rel=next");
        assert_eq!(links[0].rel, "next");
    }

    #[test]
    fn append_skips_empty_fields() {
        let pg = Pagination {
            max_id: Some(Id::from("")),
            min_id: None,
            since_id: Some(Id::from("9")),
            limit: Some(0),
        };
        let mut params = Params::new();
        pg.append_to(&mut params);
        assert_eq!(params.pairs(), &[("since_id".to_string(), "9".to_string())]);
    }
}
