//! Search parameters for the tournament and class endpoints.
//!
//! Blank string parameters are left out of the query entirely and
//! surrounding whitespace is trimmed, so a config entry like
//! `status = " PENDING "` still produces a clean query.

use courtwatch_core::config::{ClassFilter, TournamentFilter};

/// Query pairs ready for `reqwest::RequestBuilder::query`.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Page size requested for class searches.
pub const CLASS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentQuery {
    pub available_places: bool,
    pub registration_status: String,
    pub status: String,
    pub tenant_id: String,
    pub visibility: String,
}

impl TournamentQuery {
    pub fn to_query(&self) -> QueryPairs {
        let mut q = QueryPairs::new();
        if self.available_places {
            q.push(("available_places", "true".into()));
        }
        push_trimmed(&mut q, "registration_status", &self.registration_status);
        push_trimmed(&mut q, "status", &self.status);
        push_trimmed(&mut q, "tenant_id", &self.tenant_id);
        push_trimmed(&mut q, "visibility", &self.visibility);
        q
    }
}

impl From<&TournamentFilter> for TournamentQuery {
    fn from(f: &TournamentFilter) -> Self {
        Self {
            // Let the API pre-filter full tournaments when a threshold is set.
            available_places: f.min_available_places > 0,
            registration_status: f.registration_status.clone(),
            status: f.status.clone(),
            tenant_id: f.tenant_id.clone(),
            visibility: f.visibility.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassQuery {
    pub sort: String,
    pub status: String,
    pub class_type: String,
    pub tenant_ids: Vec<String>,
    pub include_summary: bool,
    pub size: u32,
    pub page: u32,
    pub course_visibility: String,
    pub show_only_available: bool,
    pub from_start_date: String,
    /// Only sent when no tenant is given.
    pub coordinate: Option<Coordinate>,
    pub radius: u32,
}

impl ClassQuery {
    pub fn to_query(&self) -> QueryPairs {
        let mut q = QueryPairs::new();
        push_trimmed(&mut q, "sort", &self.sort);
        push_trimmed(&mut q, "status", &self.status);
        push_trimmed(&mut q, "type", &self.class_type);
        if !self.tenant_ids.is_empty() {
            q.push(("tenant_id", self.tenant_ids.join(",")));
        }
        if self.include_summary {
            q.push(("include_summary", "true".into()));
        }
        if self.size > 0 {
            q.push(("size", self.size.to_string()));
        }
        q.push(("page", self.page.to_string()));
        push_trimmed(&mut q, "course_visibility", &self.course_visibility);
        if self.show_only_available {
            q.push(("show_only_available", "true".into()));
        }
        push_trimmed(&mut q, "from_start_date", &self.from_start_date);
        if let Some(c) = self.coordinate.filter(|_| self.tenant_ids.is_empty()) {
            q.push(("coordinate", format!("{:.6},{:.6}", c.lat, c.lon)));
            if self.radius > 0 {
                q.push(("radius", self.radius.to_string()));
            }
        }
        q
    }
}

impl From<&ClassFilter> for ClassQuery {
    fn from(f: &ClassFilter) -> Self {
        Self {
            status: f.status.clone(),
            class_type: f.class_type.clone(),
            tenant_ids: vec![f.tenant_id.clone()],
            // Slot counts and the course whitelist need the course summary.
            include_summary: true,
            size: CLASS_PAGE_SIZE,
            course_visibility: f.course_visibility.clone(),
            show_only_available: f.show_only_available,
            ..Default::default()
        }
    }
}

fn push_trimmed(q: &mut QueryPairs, key: &'static str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        q.push((key, value.to_string()));
    }
}
