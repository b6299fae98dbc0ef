//! Client-side navigation surface.

use std::fmt;

use crate::model::Role;

/// A navigable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    LearnerDashboard,
    LecturerDashboard,
    AdminDashboard,
    /// Landing page for roles without a dedicated dashboard.
    DefaultDashboard,
    PdfViewer,
    /// Anything else; keeps the requested path for the 404 message.
    NotFound(String),
}

/// What a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    LoginRegister { register: bool },
    Learner,
    Lecturer,
    Admin,
    PdfViewer,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match normalized {
            "" | "/" => Route::Home,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard/learner" => Route::LearnerDashboard,
            "/dashboard/lecturer" => Route::LecturerDashboard,
            "/dashboard/admin" => Route::AdminDashboard,
            "/dashboard/default" => Route::DefaultDashboard,
            "/pdf" => Route::PdfViewer,
            other => Route::NotFound(other.to_string()),
        }
    }

    /// Dashboard a user with `role` lands on after login.
    pub fn for_role(role: &Role) -> Route {
        match role {
            Role::Learner => Route::LearnerDashboard,
            Role::Lecturer => Route::LecturerDashboard,
            Role::Administrator => Route::AdminDashboard,
            Role::Other(_) => Route::DefaultDashboard,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::LearnerDashboard => "/dashboard/learner",
            Route::LecturerDashboard => "/dashboard/lecturer",
            Route::AdminDashboard => "/dashboard/admin",
            Route::DefaultDashboard => "/dashboard/default",
            Route::PdfViewer => "/pdf",
            Route::NotFound(path) => path,
        }
    }

    pub fn view(&self) -> View {
        match self {
            Route::Home | Route::Login => View::LoginRegister { register: false },
            Route::Register => View::LoginRegister { register: true },
            // The default dashboard reuses the learner view.
            Route::LearnerDashboard | Route::DefaultDashboard => View::Learner,
            Route::LecturerDashboard => View::Lecturer,
            Route::AdminDashboard => View::Admin,
            Route::PdfViewer => View::PdfViewer,
            Route::NotFound(_) => View::NotFound,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/dashboard/admin/"), Route::AdminDashboard);
        assert_eq!(Route::parse("/pdf"), Route::PdfViewer);
    }

    #[test]
    fn unknown_path_is_not_found() {
        let route = Route::parse("/dashboard/guest");
        assert_eq!(route, Route::NotFound("/dashboard/guest".into()));
        assert_eq!(route.view(), View::NotFound);
        assert_eq!(route.path(), "/dashboard/guest");
    }

    #[test]
    fn role_dispatch_has_named_default() {
        assert_eq!(Route::for_role(&Role::Learner), Route::LearnerDashboard);
        assert_eq!(Route::for_role(&Role::Lecturer), Route::LecturerDashboard);
        assert_eq!(
            Route::for_role(&Role::Administrator),
            Route::AdminDashboard
        );
        let fallback = Route::for_role(&Role::Other("auditor".into()));
        assert_eq!(fallback, Route::DefaultDashboard);
        assert_eq!(fallback.view(), View::Learner);
    }

    #[test]
    fn paths_roundtrip() {
        for route in [
            Route::Home,
            Route::Login,
            Route::Register,
            Route::LearnerDashboard,
            Route::LecturerDashboard,
            Route::AdminDashboard,
            Route::DefaultDashboard,
            Route::PdfViewer,
        ] {
            assert_eq!(Route::parse(route.path()), route);
        }
    }
}
