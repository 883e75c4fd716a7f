use std::collections::BTreeMap;

use serde::Serialize;

/// declarative description of a navigable view
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    name: String,
    view: String,
    requires_auth: bool,
    children: Vec<Route>,
}

impl Route {
    pub fn new<P, N, V>(path: P, name: N, view: V) -> Self
    where
        P: Into<String>,
        N: Into<String>,
        V: Into<String>,
    {
        Route {
            path: path.into(),
            name: name.into(),
            view: view.into(),
            requires_auth: false,
            children: Vec::new(),
        }
    }

    pub fn requires_auth(mut self, value: bool) -> Self {
        self.requires_auth = value;
        self
    }

    pub fn with_child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }

}

/// a route after its path has been joined with every ancestor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pattern: String,
    name: String,
    view: String,
    requires_auth: bool,
}

impl Record {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug)]
struct Entry {
    segments: Vec<Segment>,
    chain: Vec<Record>,
}

impl Entry {
    fn capture(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();

        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) => if !expected.eq_ignore_ascii_case(part) {
                    return None;
                },
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }

                    params.insert(name.clone(), decode_param(part));
                }
            }
        }

        Some(params)
    }
}

/// percent-decoded value, or the raw segment when it does not decode to
/// utf-8
fn decode_param(part: &str) -> String {
    match urlencoding::decode(part) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => part.to_owned(),
    }
}

/// result of resolving a path against the table
#[derive(Debug)]
pub struct Match<'a> {
    chain: &'a [Record],
    params: BTreeMap<String, String>,
}

impl<'a> Match<'a> {
    /// every matched record from the outermost parent to the target
    pub fn chain(&self) -> &'a [Record] {
        self.chain
    }

    pub fn record(&self) -> &'a Record {
        // chains are never built empty
        &self.chain[self.chain.len() - 1]
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn into_params(self) -> BTreeMap<String, String> {
        self.params
    }
}

/// immutable set of routes, flattened once on creation
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<Entry>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        let mut entries = Vec::new();

        for route in routes {
            flatten(&mut entries, &[], "", route);
        }

        RouteTable { entries }
    }

    /// records in declaration order, parents before their children
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|entry| &entry.chain[entry.chain.len() - 1])
    }

    /// resolves a request path to the first matching route chain
    pub fn resolve(&self, path: &str) -> Option<Match<'_>> {
        let parts = split_path(path)?;

        for entry in &self.entries {
            if let Some(params) = entry.capture(&parts) {
                return Some(Match {
                    chain: &entry.chain,
                    params,
                });
            }
        }

        None
    }
}

fn flatten(entries: &mut Vec<Entry>, parents: &[Record], parent_pattern: &str, route: Route) {
    let pattern = join_pattern(parent_pattern, &route.path);
    let record = Record {
        pattern: pattern.clone(),
        name: route.name,
        view: route.view,
        requires_auth: route.requires_auth,
    };

    let mut chain = parents.to_vec();
    chain.push(record);

    let segments = split_path(&pattern)
        .unwrap_or_default()
        .into_iter()
        .map(|part| match part.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_owned()),
            None => Segment::Static(part.to_owned()),
        })
        .collect();

    entries.push(Entry {
        segments,
        chain: chain.clone(),
    });

    for child in route.children {
        flatten(entries, &chain, &pattern, child);
    }
}

fn join_pattern(parent: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else if path.is_empty() {
        if parent.is_empty() {
            String::from("/")
        } else {
            parent.to_owned()
        }
    } else if parent.is_empty() || parent == "/" {
        format!("/{path}")
    } else {
        format!("{}/{path}", parent.trim_end_matches('/'))
    }
}

/// splits an absolute path into segments, ignoring one trailing slash
fn split_path(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    if rest.is_empty() {
        Some(Vec::new())
    } else {
        Some(rest.split('/').collect())
    }
}

/// the views served by the client manager
pub fn app_routes() -> RouteTable {
    RouteTable::new(vec![
        Route::new("/", "Dashboard", "dashboard")
            .requires_auth(true),
        Route::new("/login", "Login", "login"),
        Route::new("/client-form", "ClientForm", "client-form")
            .requires_auth(true),
        Route::new("/cases", "Cases", "case-status")
            .requires_auth(true),
        Route::new("/client/:id", "ClientDetails", "client-details")
            .requires_auth(true),
        Route::new("/enlaces", "Enlaces", "enlaces")
            .requires_auth(true),
        Route::new("/statistics", "Statistics", "statistics")
            .requires_auth(true),
        Route::new("/metric/:type", "MetricDetails", "metric-details")
            .requires_auth(true),
        Route::new("/schedule-appointment", "ScheduleAppointment", "schedule-appointment")
            .requires_auth(true),
        Route::new("/pending-payments", "PendingPayments", "pending-payments")
            .requires_auth(true),
    ])
}
