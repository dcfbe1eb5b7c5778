//! A tool button that also shows operation progress.
//!
//! The button's action (install, uninstall, update) is read back from the
//! action tooltip, the same string the view layer shows on hover.

use crate::style::{
    COLOR_12DP, PROGRESS_BUTTON_TEMPLATE, completed_style, dpi_scale, progress_style,
    render_accent,
};
use store_signal::{EventChannel, SlotResult};

const BUTTON_WIDTH: u32 = 130;
const BUTTON_HEIGHT: u32 = 30;

/// Operation a progress button triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Install,
    Uninstall,
    Update,
}

impl ButtonAction {
    /// Parse an action tooltip ("install", "uninstall", "update").
    pub fn from_tooltip(tooltip: &str) -> Option<Self> {
        match tooltip {
            "install" => Some(ButtonAction::Install),
            "uninstall" => Some(ButtonAction::Uninstall),
            "update" => Some(ButtonAction::Update),
            _ => None,
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            ButtonAction::Install => "install",
            ButtonAction::Uninstall => "uninstall",
            ButtonAction::Update => "update",
        }
    }

    /// Text shown while idle.
    pub fn default_text(&self) -> &'static str {
        match self {
            ButtonAction::Install => "Install",
            ButtonAction::Uninstall => "Uninstall",
            ButtonAction::Update => "Update",
        }
    }

    /// Text prefix shown while the operation runs.
    pub fn progress_text(&self) -> &'static str {
        match self {
            ButtonAction::Install => "Installing",
            ButtonAction::Uninstall => "Uninstalling",
            ButtonAction::Update => "Updating",
        }
    }
}

impl std::fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tooltip())
    }
}

/// Button model with a progress-bar stylesheet.
#[derive(Debug)]
pub struct ProgressButton {
    accent_color: String,
    style_sheet: String,
    tooltip: String,
    text: String,
    enabled: bool,
    width: u32,
    height: u32,
    /// Emitted with the current action when the button is clicked.
    pub clicked: EventChannel<ButtonAction>,
}

impl ProgressButton {
    pub fn new(accent_color: &str, dpi_factor: f32) -> Self {
        let side = |px| dpi_scale(px, dpi_factor);
        let mut button = Self {
            accent_color: String::new(),
            style_sheet: String::new(),
            tooltip: String::new(),
            text: String::new(),
            enabled: true,
            width: side(BUTTON_WIDTH),
            height: side(BUTTON_HEIGHT),
            clicked: EventChannel::with_type_tag("ButtonAction"),
        };
        button.set_accent_color(accent_color);
        button
    }

    pub fn accent_color(&self) -> &str {
        &self.accent_color
    }

    /// Change the accent colour and re-render the idle stylesheet.
    pub fn set_accent_color(&mut self, color: &str) {
        self.accent_color = color.to_string();
        self.style_sheet = render_accent(PROGRESS_BUTTON_TEMPLATE, &self.accent_color);
    }

    /// Current action, derived from the action tooltip.
    pub fn action(&self) -> Option<ButtonAction> {
        ButtonAction::from_tooltip(&self.tooltip)
    }

    /// Set the raw action tooltip.
    pub fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = tooltip.to_string();
    }

    /// Switch to `action`, resetting text and stylesheet to idle.
    pub fn set_action(&mut self, action: ButtonAction) {
        self.tooltip = action.tooltip().to_string();
        self.text = action.default_text().to_string();
        self.enabled = true;
        let accent = self.accent_color.clone();
        self.set_accent_color(&accent);
    }

    /// Update the button for `progress`.
    ///
    /// - negative: back to the idle stylesheet
    /// - `0.0..1.0`: disabled, drawn as a progress bar with a percentage
    /// - `1.0` and above: completed stylesheet, enabled again
    pub fn set_progress(&mut self, progress: f64) {
        let action = self.action();

        if progress < 0.0 {
            let accent = self.accent_color.clone();
            self.set_accent_color(&accent);
        } else if progress < 1.0 {
            self.enabled = false;
            self.style_sheet = progress_style(progress, &self.accent_color, COLOR_12DP);

            if let Some(action) = action {
                let percent = (progress * 100.0).round() as u32;
                self.text = format!("{} {}%", action.progress_text(), percent);
            }
        } else {
            self.style_sheet = completed_style(&self.accent_color);
            self.enabled = true;

            if let Some(action) = action {
                self.text = action.default_text().to_string();
            }
        }
    }

    /// Emit `clicked` if the button is enabled and has an action.
    pub fn click(&self) -> SlotResult {
        match self.action() {
            Some(action) if self.enabled => self.clicked.emit(&action),
            _ => Ok(()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style_sheet(&self) -> &str {
        &self.style_sheet
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Fixed (width, height) in device pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
