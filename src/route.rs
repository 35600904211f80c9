//! Route templates and compiled routes.
//!
//! A [`Template`] is a method plus a path pattern with `{}` placeholders.
//! Compiling substitutes concrete IDs and yields an immutable [`Route`];
//! query parameters are attached to the compiled route, never to the
//! template.

use std::fmt;

/// HTTP method for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    /// The method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route pattern with `{}` placeholders for path parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    method: Method,
    pattern: &'static str,
}

impl Template {
    /// Define a route template.
    #[must_use]
    pub const fn new(method: Method, pattern: &'static str) -> Self {
        Self { method, pattern }
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(self) -> Method {
        self.method
    }

    /// The raw pattern.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        self.pattern
    }

    /// Substitute placeholders in order and produce a compiled route.
    ///
    /// # Panics
    ///
    /// Panics if the number of arguments does not match the number of
    /// placeholders; templates and their call sites are defined together in
    /// this crate, so a mismatch is a bug.
    #[must_use]
    pub fn compile(self, args: &[&dyn fmt::Display]) -> Route {
        let parts: Vec<&str> = self.pattern.split("{}").collect();
        assert_eq!(
            parts.len() - 1,
            args.len(),
            "route {} expects {} parameters, got {}",
            self.pattern,
            parts.len() - 1,
            args.len(),
        );

        let mut path = String::with_capacity(self.pattern.len() + args.len() * 20);
        for (i, part) in parts.iter().enumerate() {
            path.push_str(part);
            if let Some(arg) = args.get(i) {
                path.push_str(&arg.to_string());
            }
        }

        Route {
            method: self.method,
            path,
            query: Vec::new(),
        }
    }
}

/// A compiled route: concrete path, method, and query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
}

impl Route {
    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// The concrete path, without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    /// Attach a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.query.push((key, value.to_string()));
        self
    }
}

/// Route catalog for the endpoints this library exposes.
pub mod routes {
    use super::{Method, Template};

    pub const GET_GUILD: Template = Template::new(Method::Get, "/guilds/{}");
    pub const GET_MEMBER: Template = Template::new(Method::Get, "/guilds/{}/members/{}");
    pub const MODIFY_MEMBER: Template = Template::new(Method::Patch, "/guilds/{}/members/{}");
    pub const REMOVE_MEMBER: Template = Template::new(Method::Delete, "/guilds/{}/members/{}");
    pub const GET_BANS: Template = Template::new(Method::Get, "/guilds/{}/bans");
    pub const CREATE_BAN: Template = Template::new(Method::Put, "/guilds/{}/bans/{}");
    pub const DELETE_BAN: Template = Template::new(Method::Delete, "/guilds/{}/bans/{}");
    pub const DELETE_ROLE: Template = Template::new(Method::Delete, "/guilds/{}/roles/{}");
    pub const GET_CHANNEL: Template = Template::new(Method::Get, "/channels/{}");
    pub const GET_MESSAGES: Template = Template::new(Method::Get, "/channels/{}/messages");
    pub const CREATE_MESSAGE: Template = Template::new(Method::Post, "/channels/{}/messages");
    pub const EDIT_MESSAGE: Template = Template::new(Method::Patch, "/channels/{}/messages/{}");
    pub const DELETE_MESSAGE: Template = Template::new(Method::Delete, "/channels/{}/messages/{}");
    pub const BULK_DELETE_MESSAGES: Template =
        Template::new(Method::Post, "/channels/{}/messages/bulk-delete");
}
