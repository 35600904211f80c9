//! The immutable request descriptor handed to the transport.

use serde_json::Value;

use crate::route::Route;

/// One network operation: compiled route, optional JSON body, optional
/// audit-log reason.
///
/// A request is assembled by an entity method and is not mutated once the
/// action built from it is handed to the caller; the only later addition is
/// the audit reason attached through
/// [`AuditableRestAction::reason`](crate::action::AuditableRestAction::reason),
/// which happens before the action can be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    route: Route,
    body: Option<Value>,
    reason: Option<String>,
}

impl Request {
    /// Build a request for a compiled route with no body.
    #[must_use]
    pub const fn new(route: Route) -> Self {
        Self {
            route,
            body: None,
            reason: None,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The compiled route.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// The JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The audit-log reason, if one was attached.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub(crate) fn set_reason(&mut self, reason: String) {
        self.reason = Some(reason);
    }
}
