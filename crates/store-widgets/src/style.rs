//! Icons, colours and stylesheet rendering for the store widgets.
//!
//! Stylesheets are plain strings in Qt stylesheet syntax. Everything here is
//! a pure function of its inputs.

/// Token replaced by the accent colour in stylesheet templates.
pub const ACCENT_TOKEN: &str = "@ACCENT";

/// Default accent colour for action buttons.
pub const DEFAULT_ACCENT: &str = "#E6A03C";

/// Surface colour at 12dp elevation, used as the empty part of progress bars.
pub const COLOR_12DP: &str = "#323232";

/// Template for an idle progress button.
pub const PROGRESS_BUTTON_TEMPLATE: &str = "QToolButton { \
border: 1px solid transparent; \
border-bottom-color: @ACCENT; \
background-color: transparent; \
color: @ACCENT; \
} \
QToolButton:hover { background-color: @ACCENT; color: white; } \
QToolButton:disabled { color: gray; border-bottom-color: gray; }";

/// Icon resources used by the store list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconSet {
    pub installed: String,
    pub update: String,
    pub error: String,
    pub not_installed: String,
    pub default_extension: String,
}

impl IconSet {
    pub fn new() -> Self {
        Self {
            installed: "icons/installed.png".into(),
            update: "icons/update.png".into(),
            error: "icons/error.png".into(),
            not_installed: "icons/not_installed.png".into(),
            default_extension: "icons/default_extension.png".into(),
        }
    }

    /// Icon set rooted at `base` instead of the relative `icons/` folder.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let join = |name: &str| format!("{base}/{name}");
        Self {
            installed: join("installed.png"),
            update: join("update.png"),
            error: join("error.png"),
            not_installed: join("not_installed.png"),
            default_extension: join("default_extension.png"),
        }
    }
}

impl Default for IconSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a stylesheet template with the given accent colour.
#[inline]
pub fn render_accent(base_style: &str, accent: &str) -> String {
    base_style.replace(ACCENT_TOKEN, accent)
}

/// Stylesheet turning a button into a left-to-right progress bar.
/// `progress` is the filled fraction in `0.0..1.0`.
pub fn progress_style(progress: f64, accent: &str, surface: &str) -> String {
    let stop_left = progress;
    let stop_right = stop_left + 0.001;

    format!(
        "QToolButton {{\
background-color:\
  qlineargradient(\
    spread:pad,\
    x1:0, y1:0, x2:1, y2:0,\
    stop: {stop_left} {accent},\
    stop:{stop_right} {surface}\
  );\
  border-color: transparent transparent {accent} transparent;\
  color: white;\
}}"
    )
}

/// Stylesheet for a button whose operation just completed.
#[inline]
pub fn completed_style(accent: &str) -> String {
    format!("QToolButton {{ border: none; background-color: {accent}; color: white}}")
}

/// Scale a pixel size by the screen DPI factor.
#[inline]
pub fn dpi_scale(px: u32, factor: f32) -> u32 {
    (px as f32 * factor).round().max(0.0) as u32
}
