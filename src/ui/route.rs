//! Navigation targets reachable from the documents page

use std::fmt;

/// A page the documents page can send the user to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CreateDocument,
    ViewDocument(String),
    Templates,
}

impl Route {
    /// Path of the target page
    pub fn path(&self) -> String {
        match self {
            Self::CreateDocument => "/dashboard/documents/create".to_string(),
            Self::ViewDocument(id) => format!("/dashboard/documents/{id}"),
            Self::Templates => "/dashboard/documents/templates".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::CreateDocument.path(), "/dashboard/documents/create");
        assert_eq!(
            Route::ViewDocument("abc".to_string()).path(),
            "/dashboard/documents/abc"
        );
        assert_eq!(Route::Templates.to_string(), "/dashboard/documents/templates");
    }
}
