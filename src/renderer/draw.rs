//! Backend-independent draw commands
//!
//! The scene describes a frame as an ordered list of primitives in screen
//! pixels (origin top-left, y down). Backends decide how pixels get made.

use glam::Vec2;

use crate::sim::Rect;

/// sRGB color with straight alpha
pub type Color = [u8; 4];

#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    [r, g, b, 255]
}

#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    [r, g, b, a]
}

/// Horizontal anchoring for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// `pos` is the top-left corner
    #[default]
    Left,
    /// `pos.x` is the horizontal center, `pos.y` the top
    Center,
    /// `pos` is the top-right corner
    Right,
}

/// A single primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        color: Color,
    },
    /// Vertical gradient
    GradientRect {
        rect: Rect,
        top: Color,
        bottom: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Ellipse inscribed in `rect`
    Ellipse {
        rect: Rect,
        color: Color,
    },
    EllipseOutline {
        rect: Rect,
        width: f32,
        color: Color,
    },
    /// Convex polygon
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    /// Named sprite centered on `center`, rotated clockwise by `rotation_deg`
    Sprite {
        name: &'static str,
        center: Vec2,
        rotation_deg: f32,
    },
    /// Text with a pixel height of `size`
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
        align: Align,
    },
}

/// Ordered list of draw commands for one frame (painter's order)
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all commands but keep the allocation for the next frame
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCmd> {
        self.cmds.iter()
    }

    pub fn rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCmd::Rect { rect, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, pos: Vec2, size: f32, color: Color, align: Align) {
        self.push(DrawCmd::Text {
            text: text.into(),
            pos,
            size,
            color,
            align,
        });
    }

    /// Text drawn twice: a shadow offset by `shadow_offset`, then the text itself
    #[allow(clippy::too_many_arguments)]
    pub fn text_with_shadow(
        &mut self,
        text: &str,
        pos: Vec2,
        size: f32,
        color: Color,
        shadow: Color,
        shadow_offset: f32,
        align: Align,
    ) {
        self.text(text, pos + Vec2::splat(shadow_offset), size, shadow, align);
        self.text(text, pos, size, color, align);
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawCmd;
    type IntoIter = std::slice::Iter<'a, DrawCmd>;

    fn into_iter(self) -> Self::IntoIter {
        self.cmds.iter()
    }
}
