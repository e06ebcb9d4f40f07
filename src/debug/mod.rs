//! Diagnostics endpoint set.
//!
//! ```text
//! GET  /                       index page (routes + current level)
//! GET  /version                build info
//! GET  /log/level              current level
//! PUT  /log/level              change level
//! GET  /debug/profile/         profiler actions
//! GET  /debug/profile/{name}   profiler snapshot
//! ```

pub mod handlers;
pub mod index;
pub mod profiler;
pub mod server;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use self::handlers::*;
use self::index::IndexPage;
use self::profiler::{ProfileKind, Profiler};
use crate::observability::{BuildInfo, LogLevelRegistry};

pub use handlers::DebugState;
pub use profiler::ProcessProfiler;
pub use server::{DebugServer, DebugServerOptions, ServerError};

pub fn setup_debug_router(
    levels: Arc<LogLevelRegistry>,
    build_info: Arc<BuildInfo>,
    profiler: Arc<dyn Profiler>,
) -> Router {
    let mut pages = IndexPage::new();
    pages.add_page("/version", "Get build information");
    pages.add_page("/log/level", "Change log level (PUT)");
    pages.add_page("/log/level", "Get current log level (GET)");
    pages.add_page("/debug/profile/", "Profile index");
    for kind in ProfileKind::ALL {
        pages.add_page(kind.path(), kind.description());
    }

    let state = DebugState {
        levels,
        build_info,
        profiler,
        index: Arc::new(pages),
    };

    Router::new()
        .route("/", get(index_page))
        .route("/version", get(version))
        .route("/log/level", get(get_log_level).put(put_log_level))
        .route("/debug/profile/", get(profile_index))
        .route("/debug/profile/{name}", get(profile))
        .layer(middleware::from_fn(track_requests))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
