//! CLI binary for merging a diff table of contents via stdin.
//!
//! Usage:
//!   echo '{"old_version": "...", "new_version": "...", "from_version": "...", "toc": [...], "changes": {...}}' \
//!     | cargo run --bin render_toc
//!
//! Input (JSON on stdin):
//!   - old_version: String, the older version identifier
//!   - new_version: String, the newer version identifier
//!   - from_version: String, the version the reader navigated from
//!   - toc: Array, table of contents of the older version (`section_id`, `index`, `title`)
//!   - changes: Object, change records keyed by label id (`{"op": "...", "node": {...}}`)
//!   - current: Optional<String>, section id to build footer navigation for
//!
//! Output (JSON on stdout):
//!   - toc: Array, merged and annotated table of contents
//!   - nav: Optional<Object>, `previous`/`next` links around `current`
//!   - error: Optional<String>, error message if the merge failed
//!
//! Logging goes to stderr; set `RUST_LOG` to change the level.

use regsite_engine::diff::RawChangeRecord;
use regsite_engine::{diff_toc, footer_nav, ChangeSet, DiffContext, FooterNav, TocEntry};
use std::collections::BTreeMap;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(serde::Deserialize)]
struct RenderRequest {
    old_version: String,
    new_version: String,
    from_version: String,
    toc: Vec<TocEntry>,
    #[serde(default)]
    changes: BTreeMap<String, RawChangeRecord>,
    #[serde(default)]
    current: Option<String>,
}

#[derive(serde::Serialize)]
struct RenderResponse {
    toc: Vec<TocEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nav: Option<FooterNav>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn fail(msg: String) -> ! {
    let resp = RenderResponse {
        toc: Vec::new(),
        nav: None,
        error: Some(msg),
    };
    println!("{}", serde_json::to_string(&resp).unwrap_or_default());
    std::process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        fail(format!("Failed to read stdin: {e}"));
    }

    let request: RenderRequest = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => fail(format!("Failed to parse request JSON: {e}")),
    };

    let changes = match ChangeSet::from_raw(request.changes) {
        Ok(changes) => changes,
        Err(e) => fail(format!("Invalid change records: {e}")),
    };

    let ctx = DiffContext::new(request.old_version, request.new_version, request.from_version);
    let toc = diff_toc(&ctx, &request.toc, &changes);
    let nav = request
        .current
        .as_deref()
        .map(|current| footer_nav(current, &toc, &ctx));

    let resp = RenderResponse {
        toc,
        nav,
        error: None,
    };
    println!("{}", serde_json::to_string(&resp).unwrap_or_default());
}
