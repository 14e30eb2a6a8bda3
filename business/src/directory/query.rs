use ustr::Ustr;

/// Column the projection sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Email,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The query state the projection is derived from. View-model only, never
/// persisted; the displayed list is always recomputed from this and the
/// authoritative list, never cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryQuery {
    /// Free-text search, matched case-insensitively against name and email.
    pub search: String,
    /// `None` means "all roles". Matched exactly, case-sensitive.
    pub role_filter: Option<Ustr>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}
