//! Description pane shown next to the store list.

use crate::style::dpi_scale;
use crate::types::Extension;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: u32 = 12;

/// Layout size policy, mirrors the toolkit's policies we use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizePolicy {
    #[default]
    Preferred,
    Maximum,
}

/// Web-view model displaying the selected extension's description.
#[derive(Clone, Debug)]
pub struct DescriptionView {
    font_family: String,
    font_size: u32,
    minimum_size: (u32, u32),
    size_policy: (SizePolicy, SizePolicy),
    html: String,
}

impl DescriptionView {
    pub fn new(font_family: &str, font_size: u32, dpi_factor: f32) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size: dpi_scale(font_size, dpi_factor),
            minimum_size: (0, 0),
            size_policy: (SizePolicy::Maximum, SizePolicy::Maximum),
            html: String::new(),
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Default font size in device pixels.
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn minimum_size(&self) -> (u32, u32) {
        self.minimum_size
    }

    /// (horizontal, vertical) size policy.
    pub fn size_policy(&self) -> (SizePolicy, SizePolicy) {
        self.size_policy
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    pub fn clear(&mut self) {
        self.html.clear();
    }

    /// Show the description of `extension`. Its description is already
    /// HTML; name and version are escaped.
    pub fn show_extension(&mut self, extension: &Extension) {
        self.html = format!(
            "<h2>{}</h2><p><i>v{}</i></p>{}",
            escape_html(&extension.name),
            escape_html(&extension.version),
            extension.description
        );
    }
}

impl Default for DescriptionView {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, 1.0)
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
