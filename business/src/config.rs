use rbacctl_states::{State, state_assign_impl};
use std::any::Any;
use ustr::Ustr;

/// Where the REST API lives. Registered as a `State` so commands read it from
/// their snapshot instead of an ambient global.
#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub api_base_url: String,
}

pub const API_URL_ENV: &str = "RBACCTL_API_URL";
const DEFAULT_API_URL: &str = "http://localhost:3000";

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
        }
    }

    /// Base URL with any trailing slash removed, ready for path joining.
    pub fn api_url(&self) -> Ustr {
        Ustr::from(self.api_base_url.trim_end_matches('/'))
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Self {
            api_base_url: base_url,
        }
    }
}

impl State for BusinessConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
