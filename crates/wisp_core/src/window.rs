//! Window and screen snapshots supplied by the host compositor
//!
//! The engine never owns the compositor's window objects. Each notification
//! carries (or refreshes) a [`WindowInfo`] describing the geometry and state the
//! engine needs for selection, model layout and damage.

use crate::geometry::{Point, Rect};
use crate::projection::Output;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host window identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Border sizes around the client area
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extents {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Extents {
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub const fn uniform(size: i32) -> Self {
        Self::new(size, size, size, size)
    }
}

/// Window type hint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    ModalDialog,
    #[default]
    Normal,
    DropdownMenu,
    PopupMenu,
    Tooltip,
    Notification,
    Combo,
    Dnd,
    Unknown,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Desktop => "desktop",
            WindowKind::Dock => "dock",
            WindowKind::Toolbar => "toolbar",
            WindowKind::Menu => "menu",
            WindowKind::Utility => "utility",
            WindowKind::Splash => "splash",
            WindowKind::Dialog => "dialog",
            WindowKind::ModalDialog => "modal_dialog",
            WindowKind::Normal => "normal",
            WindowKind::DropdownMenu => "dropdown_menu",
            WindowKind::PopupMenu => "popup_menu",
            WindowKind::Tooltip => "tooltip",
            WindowKind::Notification => "notification",
            WindowKind::Combo => "combo",
            WindowKind::Dnd => "dnd",
            WindowKind::Unknown => "unknown",
        }
    }

    /// Short-lived override windows that keep their open animation across resizes
    pub fn is_transient_menu(&self) -> bool {
        matches!(
            self,
            WindowKind::Menu
                | WindowKind::DropdownMenu
                | WindowKind::PopupMenu
                | WindowKind::Tooltip
                | WindowKind::Notification
                | WindowKind::Combo
                | WindowKind::Dnd
        )
    }
}

/// Snapshot of a host window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    pub id: WindowId,
    /// Client area origin
    pub x: i32,
    pub y: i32,
    /// Client area size
    pub width: i32,
    pub height: i32,
    /// Frame extents reacting to input
    pub input: Extents,
    /// Visible decoration extents (shadows included)
    pub output: Extents,
    pub kind: WindowKind,
    pub class: String,
    pub name: String,
    pub title: String,
    pub role: String,
    /// Taskbar icon rectangle, if the panel published one
    pub icon_geometry: Option<Rect>,
    /// Paint opacity in [0, 1]
    pub opacity: f32,
    pub has_alpha: bool,
    pub shaded: bool,
    pub minimized: bool,
    pub mapped: bool,
    /// Hidden by the window manager (other desktop, showing desktop)
    pub hidden: bool,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
}

impl Default for WindowInfo {
    fn default() -> Self {
        Self {
            id: WindowId(0),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            input: Extents::default(),
            output: Extents::default(),
            kind: WindowKind::Normal,
            class: String::new(),
            name: String::new(),
            title: String::new(),
            role: String::new(),
            icon_geometry: None,
            opacity: 1.0,
            has_alpha: false,
            shaded: false,
            minimized: false,
            mapped: true,
            hidden: false,
            skip_taskbar: false,
            skip_pager: false,
        }
    }
}

impl WindowInfo {
    pub fn new(id: WindowId, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: WindowKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_extents(mut self, input: Extents, output: Extents) -> Self {
        self.input = input;
        self.output = output;
        self
    }

    pub fn with_icon(mut self, icon: Rect) -> Self {
        self.icon_geometry = Some(icon);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Client area
    pub fn client_rect(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Client area plus output (decoration) extents
    pub fn outer_rect(&self) -> Rect {
        Rect::new(
            (self.x - self.output.left) as f32,
            (self.y - self.output.top) as f32,
            (self.width + self.output.left + self.output.right) as f32,
            (self.height + self.output.top + self.output.bottom) as f32,
        )
    }

    /// Client area plus input (frame) extents
    pub fn border_rect(&self) -> Rect {
        Rect::new(
            (self.x - self.input.left) as f32,
            (self.y - self.input.top) as f32,
            (self.width + self.input.left + self.input.right) as f32,
            (self.height + self.input.top + self.input.bottom) as f32,
        )
    }

    /// Whether the compositor would paint the window at all
    pub fn is_viewable(&self) -> bool {
        self.mapped && !self.hidden && !self.minimized && self.width > 0 && self.height > 0
    }

    /// Windows excluded from stacking comparisons
    pub fn is_stacking_relevant(&self) -> bool {
        self.is_viewable() && !self.skip_taskbar && !self.skip_pager
    }
}

/// Screen snapshot: size and output layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub width: i32,
    pub height: i32,
    pub outputs: Vec<Output>,
}

impl ScreenInfo {
    /// Single-output screen
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            outputs: vec![Output::new(Rect::new(
                0.0,
                0.0,
                width as f32,
                height as f32,
            ))],
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<Output>) -> Self {
        if !outputs.is_empty() {
            self.outputs = outputs;
        }
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// Output containing the point, falling back to the first one
    pub fn output_at(&self, p: Point) -> Output {
        self.outputs
            .iter()
            .find(|o| o.region.contains(p))
            .or_else(|| self.outputs.first())
            .copied()
            .unwrap_or_else(|| Output::new(self.rect()))
    }
}

impl Default for ScreenInfo {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}
