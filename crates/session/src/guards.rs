//! Route authorization
//!
//! Guards are plain functions of a [`SessionSnapshot`] and the navigation
//! target. They never mutate the session.

use crate::state::SessionSnapshot;
use corretaje_core::User;

/// Application routes the guards redirect to
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const SELECT_COMPANY: &str = "/select-company";
    pub const DASHBOARD: &str = "/dashboard";
    pub const ADMIN: &str = "/admin";
    pub const ADMIN_COMPANIES: &str = "/admin/companies";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Require a session, and keep it on the selection route while a company
/// choice is pending
pub fn authenticate(session: &SessionSnapshot, path: &str) -> Decision {
    let Some(user) = session.user.as_ref() else {
        return Decision::Redirect(routes::LOGIN);
    };

    match (
        user.requires_company_selection,
        is_under(path, routes::SELECT_COMPANY),
    ) {
        (true, false) => Decision::Redirect(routes::SELECT_COMPANY),
        (false, true) => Decision::Redirect(routes::DASHBOARD),
        _ => Decision::Allow,
    }
}

/// [`authenticate`], then require a super admin. Other users are sent to the
/// dashboard rather than refused.
pub fn authorize_admin(session: &SessionSnapshot, path: &str) -> Decision {
    match authenticate(session, path) {
        Decision::Allow if session.is_super_admin() => Decision::Allow,
        Decision::Allow => Decision::Redirect(routes::DASHBOARD),
        redirect => redirect,
    }
}

/// Where the root path sends a signed-in user
pub fn landing_route(user: &User) -> &'static str {
    if user.is_super_admin {
        routes::ADMIN
    } else {
        routes::DASHBOARD
    }
}

/// Where to go once a company has been chosen
pub fn post_selection_route(user: &User) -> &'static str {
    if user.is_super_admin {
        routes::ADMIN_COMPANIES
    } else {
        routes::DASHBOARD
    }
}

/// Guard attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    Public,
    Authenticated,
    Admin,
}

impl RouteGuard {
    pub fn for_path(path: &str) -> Self {
        if is_under(path, routes::ADMIN) {
            Self::Admin
        } else if is_under(path, routes::LOGIN) {
            Self::Public
        } else {
            Self::Authenticated
        }
    }

    pub fn evaluate(&self, session: &SessionSnapshot, path: &str) -> Decision {
        match self {
            Self::Public => Decision::Allow,
            Self::Authenticated => authenticate(session, path),
            Self::Admin => authorize_admin(session, path),
        }
    }
}

/// Guard for `path` and its decision in one step
pub fn evaluate(session: &SessionSnapshot, path: &str) -> Decision {
    RouteGuard::for_path(path).evaluate(session, path)
}

/// `path` is `route` or one of its children; query and fragment are ignored
fn is_under(path: &str, route: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.strip_prefix(route)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(requires_company_selection: bool, is_super_admin: bool) -> User {
        User {
            uid: "u-1".into(),
            email: "ana@corretaje.test".into(),
            role: Some(if is_super_admin { "SuperAdmin" } else { "Agente" }.into()),
            is_super_admin,
            company_id: (!requires_company_selection).then(|| "c1".into()),
            office_id: None,
            entity_id: None,
            name: None,
            requires_company_selection,
        }
    }

    fn session(requires_company_selection: bool, is_super_admin: bool) -> SessionSnapshot {
        SessionSnapshot {
            user: Some(user(requires_company_selection, is_super_admin)),
            pending_companies: Vec::new(),
        }
    }

    #[test]
    fn test_anonymous_goes_to_login() {
        let anonymous = SessionSnapshot::anonymous();
        for path in ["/dashboard", "/select-company", "/admin/users", "/"] {
            assert_eq!(
                authenticate(&anonymous, path),
                Decision::Redirect(routes::LOGIN)
            );
        }
        assert_eq!(
            authorize_admin(&anonymous, "/admin"),
            Decision::Redirect(routes::LOGIN)
        );
    }

    #[test]
    fn test_pending_selection_is_confined_to_selection_route() {
        let pending = session(true, false);
        assert_eq!(
            authenticate(&pending, "/dashboard"),
            Decision::Redirect(routes::SELECT_COMPANY)
        );
        assert_eq!(authenticate(&pending, "/select-company"), Decision::Allow);
        assert_eq!(authenticate(&pending, "/select-company?from=login"), Decision::Allow);
        assert_eq!(
            authenticate(&pending, "/select-companyx"),
            Decision::Redirect(routes::SELECT_COMPANY)
        );
    }

    #[test]
    fn test_selected_session_leaves_selection_route() {
        let selected = session(false, false);
        assert_eq!(
            authenticate(&selected, "/select-company"),
            Decision::Redirect(routes::DASHBOARD)
        );
        assert_eq!(authenticate(&selected, "/dashboard"), Decision::Allow);
        assert_eq!(authenticate(&selected, "/cases/42"), Decision::Allow);
    }

    #[test]
    fn test_admin_guard() {
        assert_eq!(
            authorize_admin(&session(false, false), "/admin"),
            Decision::Redirect(routes::DASHBOARD)
        );
        assert_eq!(authorize_admin(&session(false, true), "/admin"), Decision::Allow);

        // Selection still comes first for admins
        assert_eq!(
            authorize_admin(&session(true, true), "/admin/companies"),
            Decision::Redirect(routes::SELECT_COMPANY)
        );
    }

    #[test]
    fn test_route_table() {
        assert_eq!(RouteGuard::for_path("/login"), RouteGuard::Public);
        assert_eq!(RouteGuard::for_path("/admin"), RouteGuard::Admin);
        assert_eq!(RouteGuard::for_path("/admin/offices/3"), RouteGuard::Admin);
        assert_eq!(RouteGuard::for_path("/administration"), RouteGuard::Authenticated);
        assert_eq!(RouteGuard::for_path("/dashboard"), RouteGuard::Authenticated);

        let anonymous = SessionSnapshot::anonymous();
        assert!(evaluate(&anonymous, "/login").is_allowed());
        assert_eq!(
            evaluate(&session(false, false), "/admin/users"),
            Decision::Redirect(routes::DASHBOARD)
        );
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(landing_route(&user(false, true)), routes::ADMIN);
        assert_eq!(landing_route(&user(false, false)), routes::DASHBOARD);
        assert_eq!(post_selection_route(&user(false, true)), routes::ADMIN_COMPANIES);
        assert_eq!(post_selection_route(&user(false, false)), routes::DASHBOARD);
    }
}
