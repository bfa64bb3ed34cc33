use serde_json::{json, Map, Value};

/// Records per page across every resource kind.
pub const PAGE_SIZE: i64 = 10;

/// Position of one page within a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    pub page_number: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

impl PagePosition {
    /// Resolve a requested page number against the current record count.
    ///
    /// An empty table still has one (empty) page; out-of-range requests clamp
    /// to the nearest valid page rather than failing.
    pub fn resolve(requested_page: i64, total_count: i64) -> Self {
        let total_pages = std::cmp::max((total_count + PAGE_SIZE - 1) / PAGE_SIZE, 1);
        let page_number = requested_page.clamp(1, total_pages);
        Self {
            page_number,
            total_pages,
            total_count,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page_number - 1) * PAGE_SIZE
    }
}

/// Parse the `?page=` query value. Missing or non-numeric input means the
/// first page, never a client error.
pub fn parse_page_param(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok()).unwrap_or(1)
}

/// Navigation links for a page: next/last when anything follows, prev/first
/// when anything precedes.
pub fn navigation_links(kind: &str, position: &PagePosition) -> Map<String, Value> {
    let mut links = Map::new();
    if position.page_number < position.total_pages {
        links.insert(
            "nextPage".into(),
            json!(format!("/{}?page={}", kind, position.page_number + 1)),
        );
        links.insert(
            "lastPage".into(),
            json!(format!("/{}?page={}", kind, position.total_pages)),
        );
    }
    if position.page_number > 1 {
        links.insert(
            "prevPage".into(),
            json!(format!("/{}?page={}", kind, position.page_number - 1)),
        );
        links.insert("firstPage".into(), json!(format!("/{}?page=1", kind)));
    }
    links
}

/// Assemble the listing response body. The record array sits under the
/// resource kind's own name.
pub fn page_envelope(kind: &str, records: Vec<Value>, position: &PagePosition) -> Value {
    let links = navigation_links(kind, position);

    let mut body = Map::new();
    body.insert(kind.to_string(), Value::Array(records));
    body.insert("pageNumber".into(), json!(position.page_number));
    body.insert("totalPages".into(), json!(position.total_pages));
    body.insert("pageSize".into(), json!(PAGE_SIZE));
    body.insert("totalCount".into(), json!(position.total_count));
    body.insert("links".into(), Value::Object(links));
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_still_has_one_page() {
        let pos = PagePosition::resolve(1, 0);
        assert_eq!(pos.page_number, 1);
        assert_eq!(pos.total_pages, 1);
        assert_eq!(pos.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PagePosition::resolve(1, 10).total_pages, 1);
        assert_eq!(PagePosition::resolve(1, 11).total_pages, 2);
        assert_eq!(PagePosition::resolve(1, 25).total_pages, 3);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        assert_eq!(PagePosition::resolve(0, 25).page_number, 1);
        assert_eq!(PagePosition::resolve(-3, 25).page_number, 1);
        assert_eq!(PagePosition::resolve(99, 25).page_number, 3);
    }

    #[test]
    fn page_param_defaults_to_first_page() {
        assert_eq!(parse_page_param(None), 1);
        assert_eq!(parse_page_param(Some("abc")), 1);
        assert_eq!(parse_page_param(Some("2")), 2);
        assert_eq!(parse_page_param(Some("-5")), -5);
    }

    #[test]
    fn single_page_has_no_links() {
        let pos = PagePosition::resolve(1, 5);
        assert!(navigation_links("gps", &pos).is_empty());
    }

    #[test]
    fn first_of_many_pages_links_forward_only() {
        let pos = PagePosition::resolve(1, 35);
        let links = navigation_links("gps", &pos);
        assert_eq!(links["nextPage"], "/gps?page=2");
        assert_eq!(links["lastPage"], "/gps?page=4");
        assert!(!links.contains_key("prevPage"));
        assert!(!links.contains_key("firstPage"));
    }

    #[test]
    fn last_page_links_backward_only() {
        let pos = PagePosition::resolve(4, 35);
        let links = navigation_links("gps", &pos);
        assert_eq!(links["prevPage"], "/gps?page=3");
        assert_eq!(links["firstPage"], "/gps?page=1");
        assert!(!links.contains_key("nextPage"));
        assert!(!links.contains_key("lastPage"));
    }

    #[test]
    fn middle_page_links_both_ways() {
        let pos = PagePosition::resolve(2, 35);
        let links = navigation_links("ecu", &pos);
        assert_eq!(links.len(), 4);
    }

    #[test]
    fn envelope_keys_match_wire_contract() {
        let pos = PagePosition::resolve(1, 0);
        let body = page_envelope("accelerometer", vec![], &pos);
        assert!(body["accelerometer"].is_array());
        assert_eq!(body["pageNumber"], 1);
        assert_eq!(body["totalPages"], 1);
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["totalCount"], 0);
        assert!(body["links"].is_object());
    }
}
