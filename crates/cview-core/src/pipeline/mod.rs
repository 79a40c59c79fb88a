//! Rendering pipeline
//!
//! Decodes the body, runs the selected viewer inside an isolation boundary
//! and falls back to Raw when the viewer declines or fails.

mod context;

pub use context::Context;

use crate::config::{Config, ViewOptions};
use crate::encoding;
use crate::error::{Error, Result};
use crate::headers::Headers;
use crate::lines::{Line, Rendered};
use crate::registry::{self, Capabilities, Registry};
use crate::views::{render_raw, View, Viewer};
use serde::Serialize;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Once};
use tracing::{debug, instrument, warn};

/// Status and body produced for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    /// Space-separated status parts, e.g. `[decoded gzip] JSON`
    pub status: String,
    /// Rendered body lines
    pub lines: Vec<Line>,
}

thread_local! {
    static ISOLATED: Cell<bool> = const { Cell::new(false) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a panic hook that stays quiet inside [`run_isolated`]
///
/// Inside the boundary the backtrace is taken at the panic site and kept for
/// the fault report; elsewhere the previous hook runs unchanged.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if ISOLATED.with(Cell::get) {
                let trace = Backtrace::force_capture().to_string();
                PANIC_TRACE.with(|t| *t.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A viewer fault with the backtrace closest to where it happened
struct Fault {
    error: Error,
    trace: String,
}

/// Run `viewer`, turning errors and panics into a [`Fault`]
///
/// A returned `Err` is traced at this call; a panic is traced where it was
/// raised.
fn run_isolated(
    viewer: &dyn Viewer,
    headers: &Headers,
    content: &[u8],
    limit: usize,
    ctx: &Context,
) -> std::result::Result<Option<Rendered>, Fault> {
    install_panic_hook();
    let outer = ISOLATED.with(|f| f.replace(true));
    let result = catch_unwind(AssertUnwindSafe(|| viewer.render(headers, content, limit, ctx)));
    ISOLATED.with(|f| f.set(outer));

    match result {
        Ok(Ok(rendered)) => Ok(rendered),
        Ok(Err(error)) => Err(Fault {
            error,
            trace: Backtrace::force_capture().to_string(),
        }),
        Err(payload) => Err(Fault {
            error: Error::ViewPanic {
                view: viewer.name(),
                message: panic_message(payload.as_ref()),
            },
            trace: PANIC_TRACE
                .with(|t| t.borrow_mut().take())
                .unwrap_or_else(|| Backtrace::force_capture().to_string()),
        }),
    }
}

/// Render a message body with `viewer`
///
/// Empty content short-circuits to `"No content"`. A `Content-Encoding`
/// other than `identity` is decoded first; decoding failures are silent and
/// the original bytes are used. Viewer faults are reported through `sink`
/// and, like a decline, fall back to Raw.
#[instrument(skip_all, fields(view = viewer.name(), len = content.len(), limit = limit))]
pub fn get_content_view<I, K, V>(
    viewer: &dyn Viewer,
    header_items: I,
    content: &[u8],
    limit: usize,
    ctx: &Context,
    sink: &mut dyn FnMut(&str),
) -> RenderOutcome
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    if content.is_empty() {
        return RenderOutcome {
            status: "No content".to_string(),
            lines: Vec::new(),
        };
    }

    let headers = Headers::from_items(header_items);
    let mut msg = Vec::new();

    let decoded = match headers.get_first("content-encoding") {
        Some(enc) if !enc.trim().is_empty() && !enc.trim().eq_ignore_ascii_case("identity") => {
            match encoding::decode(enc, content, ctx.options().max_decoded_size) {
                Ok(decoded) if !decoded.is_empty() => {
                    msg.push(format!("[decoded {enc}]"));
                    Some(decoded)
                }
                Ok(_) => None,
                Err(e) => {
                    debug!("Keeping encoded body: {e}");
                    None
                }
            }
        }
        _ => None,
    };
    let content = decoded.as_deref().unwrap_or(content);

    let rendered = match run_isolated(viewer, &headers, content, limit, ctx) {
        Ok(rendered) => rendered,
        Err(Fault { error, trace }) => {
            warn!(view = viewer.name(), "Content viewer failed: {error}");
            let report = format!(
                "Content viewer failed: \n{}: {}\n{}",
                viewer.name(),
                error,
                trace
            );
            sink(&report);
            None
        }
    };

    let rendered = match rendered {
        Some(rendered) => {
            msg.push(rendered.kind.clone());
            rendered
        }
        None => {
            debug!(view = viewer.name(), "Falling back to Raw");
            msg.push("Couldn't parse: falling back to Raw".to_string());
            render_raw(content, limit)
        }
    };

    RenderOutcome {
        status: msg.join(" "),
        lines: rendered.lines,
    }
}

/// Configured entry point for rendering message bodies
///
/// Owns the options derived from a [`Config`] and the registry matching
/// its feature switches.
#[derive(Debug, Clone)]
pub struct ContentView {
    ctx: Context,
    default_view: View,
}

impl ContentView {
    /// Build from a validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let caps = Capabilities::detect().with_config(config.features.amf);
        let registry = if caps == Capabilities::detect() {
            registry::global()
        } else {
            Arc::new(Registry::new(caps))
        };
        let default_view = registry.lookup(&config.view.default_view)?;

        Ok(Self {
            ctx: Context::new(registry, config.view_options()),
            default_view,
        })
    }

    /// Registry in use
    pub fn registry(&self) -> &Registry {
        self.ctx.registry()
    }

    /// Options in use
    pub fn options(&self) -> &ViewOptions {
        self.ctx.options()
    }

    /// Viewer used when none is requested
    pub fn default_view(&self) -> View {
        self.default_view
    }

    /// Render with the named viewer (name, label or shortcut), or the default
    ///
    /// `limit` overrides the configured output limit.
    pub fn render<I, K, V>(
        &self,
        view: Option<&str>,
        header_items: I,
        content: &[u8],
        limit: Option<usize>,
        sink: &mut dyn FnMut(&str),
    ) -> Result<RenderOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let view = match view {
            Some(query) => self.registry().lookup(query)?,
            None => self.default_view,
        };
        let limit = limit.unwrap_or(self.options().limit);
        Ok(get_content_view(&view, header_items, content, limit, &self.ctx, sink))
    }
}

impl Default for ContentView {
    fn default() -> Self {
        Self {
            ctx: Context::default(),
            default_view: View::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::MockViewer;

    const NO_HEADERS: [(&str, &str); 0] = [];

    // Handwritten rather than mocked: the panic must unwind through render.
    struct PanickingViewer;

    impl Viewer for PanickingViewer {
        fn name(&self) -> &'static str {
            "Panicky"
        }

        fn shortcut(&self) -> char {
            'p'
        }

        fn content_types(&self) -> &'static [&'static str] {
            &[]
        }

        fn render(
            &self,
            _headers: &Headers,
            _content: &[u8],
            _limit: usize,
            _ctx: &Context,
        ) -> Result<Option<Rendered>> {
            panic!("viewer exploded");
        }
    }

    fn run(viewer: &dyn Viewer, content: &[u8]) -> (RenderOutcome, Vec<String>) {
        let mut logged = Vec::new();
        let outcome = get_content_view(
            viewer,
            NO_HEADERS,
            content,
            1000,
            &Context::default(),
            &mut |s| logged.push(s.to_string()),
        );
        (outcome, logged)
    }

    #[test]
    fn test_empty_content_runs_no_viewer() {
        let mut mock = MockViewer::new();
        mock.expect_name().return_const("Mock");
        mock.expect_render().never();

        let (outcome, logged) = run(&mock, b"");
        assert_eq!(outcome.status, "No content");
        assert!(outcome.lines.is_empty());
        assert!(logged.is_empty());
    }

    #[test]
    fn test_decline_falls_back_to_raw() {
        let mut mock = MockViewer::new();
        mock.expect_name().return_const("Mock");
        mock.expect_render().times(1).returning(|_, _, _, _| Ok(None));

        let (outcome, logged) = run(&mock, b"hello");
        assert_eq!(outcome.status, "Couldn't parse: falling back to Raw");
        assert_eq!(outcome.lines[0].plain_text(), "hello");
        assert!(logged.is_empty());
    }

    #[test]
    fn test_error_is_reported_and_falls_back() {
        let mut mock = MockViewer::new();
        mock.expect_name().return_const("Mock");
        mock.expect_render()
            .returning(|_, _, _, _| Err(Error::view("Mock", "bad state")));

        let (outcome, logged) = run(&mock, b"hello");
        assert_eq!(outcome.status, "Couldn't parse: falling back to Raw");
        assert_eq!(logged.len(), 1);
        assert!(logged[0].starts_with("Content viewer failed: \nMock: "));
        assert!(logged[0].contains("bad state"));
    }

    #[test]
    fn test_panic_is_contained() {
        let (outcome, logged) = run(&PanickingViewer, b"payload");
        assert_eq!(outcome.status, "Couldn't parse: falling back to Raw");
        assert_eq!(outcome.lines[0].plain_text(), "payload");
        assert_eq!(logged.len(), 1);
        assert!(logged[0].contains("viewer exploded"));
    }

    #[test]
    fn test_panic_trace_taken_at_panic_site() {
        let headers = Headers::default();
        let Err(fault) = run_isolated(&PanickingViewer, &headers, b"x", 10, &Context::default())
        else {
            panic!("expected a fault");
        };
        assert!(matches!(fault.error, Error::ViewPanic { view: "Panicky", .. }));
        assert!(!fault.trace.is_empty());
        // consumed by the report, and the boundary is closed again
        assert!(PANIC_TRACE.with(|t| t.borrow().is_none()));
        assert!(!ISOLATED.with(Cell::get));
    }

    #[test]
    fn test_success_uses_kind_label() {
        let mut mock = MockViewer::new();
        mock.expect_name().return_const("Mock");
        mock.expect_render()
            .returning(|_, _, _, _| Ok(Some(Rendered::new("Mocked", vec![Line::new()]))));

        let (outcome, _) = run(&mock, b"x");
        assert_eq!(outcome.status, "Mocked");
        assert_eq!(outcome.lines.len(), 1);
    }

    #[test]
    fn test_unknown_encoding_is_silent() {
        let mut logged = Vec::new();
        let outcome = get_content_view(
            &View::Raw,
            [("Content-Encoding", "br")],
            b"abc",
            1000,
            &Context::default(),
            &mut |s| logged.push(s.to_string()),
        );
        assert_eq!(outcome.status, "Raw");
        assert!(logged.is_empty());
    }

    #[test]
    fn test_blank_encoding_is_not_decoded() {
        for enc in ["", "  ", "identity"] {
            let outcome = get_content_view(
                &View::Raw,
                [("Content-Encoding", enc)],
                b"abc",
                1000,
                &Context::default(),
                &mut |_| {},
            );
            assert_eq!(outcome.status, "Raw");
        }
    }

    #[test]
    fn test_content_view_lookup() {
        let cv = ContentView::new(&Config::default()).unwrap();
        assert_eq!(cv.default_view(), View::Auto);
        let outcome = cv
            .render(Some("j"), NO_HEADERS, br#"{"a":1}"#, None, &mut |_| {})
            .unwrap();
        assert_eq!(outcome.status, "JSON");
        assert!(matches!(
            cv.render(Some("nope"), NO_HEADERS, b"x", None, &mut |_| {}),
            Err(Error::UnknownView(_))
        ));
    }

    #[cfg(feature = "amf")]
    #[test]
    fn test_content_view_respects_amf_switch() {
        let mut config = Config::default();
        config.features.amf = false;
        let cv = ContentView::new(&config).unwrap();
        assert!(cv.registry().by_shortcut('f').is_none());
    }
}
