//! Inline fixtures shared by the benches.

/// The URI templates making up a routing tree plus the request paths probed
/// against it. Probes mix hits and misses so that backtracking shows up in
/// the numbers.
#[derive(Debug, Copy, Clone)]
pub struct RouteTable {
    name: &'static str,
    templates: &'static [&'static str],
    probes: &'static [&'static str],
}

impl RouteTable {
    pub const fn new(
        name: &'static str,
        templates: &'static [&'static str],
        probes: &'static [&'static str],
    ) -> RouteTable {
        RouteTable { name, templates, probes }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn templates(&self) -> &'static [&'static str] {
        self.templates
    }

    pub fn probes(&self) -> &'static [&'static str] {
        self.probes
    }
}
