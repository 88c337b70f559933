use axum::{routing::get, Json, Router};
use serde::Serialize;

/// A client-side page of the marketing site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SitePage {
    pub path: &'static str,
    pub title: &'static str,
}

pub const SITE_PAGES: [SitePage; 4] = [
    SitePage {
        path: "/",
        title: "Home",
    },
    SitePage {
        path: "/admission-process",
        title: "Admission Process",
    },
    SitePage {
        path: "/cv-jobs",
        title: "CV & Jobs Portal",
    },
    SitePage {
        path: "/contact",
        title: "Contact",
    },
];

pub fn site_router() -> Router {
    Router::new().route("/api/v1/site/routes", get(routes_handler))
}

pub(crate) async fn routes_handler() -> Json<Vec<SitePage>> {
    Json(SITE_PAGES.to_vec())
}
