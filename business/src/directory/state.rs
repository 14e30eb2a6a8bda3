use rbacctl_states::{State, state_assign_impl};
use std::any::Any;
use ustr::Ustr;

use super::query::{DirectoryQuery, SortDirection, SortField};

/// Query state for the user directory. Mutations are pure state updates with
/// no network effect; the projection compute picks them up through the
/// dependency graph.
#[derive(Debug, Clone, Default)]
pub struct UserDirectoryState {
    query: DirectoryQuery,
}

impl UserDirectoryState {
    pub fn query(&self) -> &DirectoryQuery {
        &self.query
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query.search = text.into();
    }

    pub fn set_role_filter(&mut self, role: Option<Ustr>) {
        self.query.role_filter = role;
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.query.sort_field = field;
        self.query.sort_direction = direction;
    }

    /// Column-header behavior: clicking the current sort field flips the
    /// direction, clicking a new field resets to ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.query.sort_field == field {
            self.query.sort_direction = self.query.sort_direction.flipped();
        } else {
            self.query.sort_field = field;
            self.query.sort_direction = SortDirection::Ascending;
        }
    }
}

impl State for UserDirectoryState {
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
