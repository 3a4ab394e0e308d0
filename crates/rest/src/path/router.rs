use std::fmt;

use http::Method;

use crate::endpoint::{Endpoint, EndpointMap};
use crate::path::matcher::SegmentMatcher;
use crate::path::parameter::PathParameter;
use crate::path::segment::{Scanner, Segment};
use crate::path::InvalidUriTemplate;
use std::sync::Arc;

/// One node of the routing tree. Each node carries the template for its own
/// path segment, the endpoints registered directly at this level keyed by
/// HTTP method, and the child nodes for deeper levels in registration order.
pub struct PathRouter {
    template: SegmentMatcher,
    routers: Vec<PathRouter>,
    endpoints: EndpointMap,
}

impl PathRouter {
    pub fn new(template: SegmentMatcher) -> PathRouter {
        PathRouter { template, routers: Vec::new(), endpoints: EndpointMap::new() }
    }

    /// Registers an endpoint under the remaining template segments of the
    /// scanner. Current segments (`/.`) and root segments are skipped, a
    /// previous segment (`/..`) hands the remaining input back to the caller
    /// which continues one level up.
    ///
    /// A child node is committed only when the registration completes inside
    /// it. Children created for a path that later folds away with `/..` are
    /// discarded again.
    pub fn register(
        &mut self,
        mut scanner: Scanner,
        method: &Method,
        endpoint: &Arc<dyn Endpoint>,
    ) -> Result<Scanner, InvalidUriTemplate> {
        while let Some(raw) = scanner.next() {
            let next_segment = Segment::parse(&raw);
            if next_segment.is_current() || next_segment.is_root() {
                continue;
            }
            if next_segment.is_previous() {
                return Ok(Scanner::new(&scanner.remaining()));
            }
            let template = SegmentMatcher::parse(&raw)?;
            if let Some(idx) = self.routers.iter().position(|router| router.template == template) {
                scanner = self.routers[idx].register(scanner, method, endpoint)?;
                if !scanner.has_next() {
                    return Ok(scanner);
                }
            } else {
                let mut router = PathRouter::new(template);
                scanner = router.register(scanner, method, endpoint)?;
                if !scanner.has_next() {
                    self.routers.push(router);
                    return Ok(scanner);
                }
                // the subtree folded away with "/..", drop the child again
            }
        }
        self.endpoints.insert(method.clone(), Arc::clone(endpoint));
        Ok(scanner)
    }

    /// Descends into the tree along the scanner and returns the endpoints of
    /// the node the path ends at. Children are tried in registration order and
    /// a subtree without any endpoints for the remaining path is backtracked
    /// out of, rewinding the scanner for the next candidate.
    pub fn route(&self, scanner: &mut Scanner, parameters: &mut Vec<PathParameter>) -> EndpointMap {
        let Some(raw) = scanner.next() else {
            return self.endpoints.clone();
        };
        let next = Segment::parse(&raw);
        for router in &self.routers {
            let saved = scanner.pos();
            let Ok(mut matched) = router.template.match_segment(&next) else {
                continue;
            };
            let found = router.route(scanner, &mut matched);
            if found.is_empty() {
                scanner.set_pos(saved);
                continue;
            }
            parameters.append(&mut matched);
            return found;
        }
        EndpointMap::new()
    }

    pub fn template(&self) -> &SegmentMatcher {
        &self.template
    }

    pub fn routers(&self) -> &[PathRouter] {
        &self.routers
    }

    pub fn endpoints(&self) -> &EndpointMap {
        &self.endpoints
    }
}

impl fmt::Debug for PathRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRouter")
            .field("template", &self.template.definition())
            .field("methods", &self.endpoints.keys().collect::<Vec<_>>())
            .field("routers", &self.routers)
            .finish()
    }
}

impl fmt::Display for PathRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template.definition())
    }
}
