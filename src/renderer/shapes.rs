//! Shape tessellation for 2D primitives
//!
//! Everything becomes a flat triangle list in screen pixels. The pipeline maps
//! pixels to clip space afterwards.

use glam::Vec2;
use std::f32::consts::PI;

use super::draw::{Align, DrawCmd, DrawList};
use super::font;
use super::vertex::{Vertex, linear_color};
use crate::assets::{Sprite, SpritePart, SpriteSheet};
use crate::sim::Rect;

/// Segments used for a circle of the given radius
fn segments_for(radius: f32) -> u32 {
    ((radius * 1.5) as u32).clamp(8, 48)
}

fn push_quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], colors: [[f32; 4]; 4]) {
    // corners: top-left, top-right, bottom-right, bottom-left
    out.push(Vertex::at(corners[0], colors[0]));
    out.push(Vertex::at(corners[1], colors[1]));
    out.push(Vertex::at(corners[2], colors[2]));

    out.push(Vertex::at(corners[0], colors[0]));
    out.push(Vertex::at(corners[2], colors[2]));
    out.push(Vertex::at(corners[3], colors[3]));
}

/// Generate vertices for a filled rectangle
pub fn rect(out: &mut Vec<Vertex>, r: &Rect, color: [f32; 4]) {
    gradient_rect(out, r, color, color);
}

/// Generate vertices for a rectangle shaded from `top` to `bottom`
pub fn gradient_rect(out: &mut Vec<Vertex>, r: &Rect, top: [f32; 4], bottom: [f32; 4]) {
    if r.is_empty() {
        return;
    }
    let corners = [
        Vec2::new(r.x, r.y),
        Vec2::new(r.right(), r.y),
        Vec2::new(r.right(), r.bottom()),
        Vec2::new(r.x, r.bottom()),
    ];
    push_quad(out, corners, [top, top, bottom, bottom]);
}

/// Generate vertices for a filled ellipse
pub fn ellipse(out: &mut Vec<Vertex>, center: Vec2, radii: Vec2, color: [f32; 4]) {
    let segments = segments_for(radii.max_element());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        out.push(Vertex::at(center, color));
        out.push(Vertex::new(
            center.x + radii.x * theta1.cos(),
            center.y + radii.y * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radii.x * theta2.cos(),
            center.y + radii.y * theta2.sin(),
            color,
        ));
    }
}

/// Generate vertices for a filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4]) {
    ellipse(out, center, Vec2::splat(radius), color);
}

/// Generate vertices for an elliptical band `width` pixels thick (drawn inward)
pub fn ellipse_ring(out: &mut Vec<Vertex>, center: Vec2, radii: Vec2, width: f32, color: [f32; 4]) {
    let segments = segments_for(radii.max_element());
    let inner_radii = (radii - Vec2::splat(width)).max(Vec2::ZERO);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());

        let inner1 = center + dir1 * inner_radii;
        let outer1 = center + dir1 * radii;
        let inner2 = center + dir2 * inner_radii;
        let outer2 = center + dir2 * radii;

        // Two triangles per segment
        out.push(Vertex::at(inner1, color));
        out.push(Vertex::at(outer1, color));
        out.push(Vertex::at(inner2, color));

        out.push(Vertex::at(inner2, color));
        out.push(Vertex::at(outer1, color));
        out.push(Vertex::at(outer2, color));
    }
}

/// Generate vertices for a convex polygon (triangle fan)
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: [f32; 4]) {
    if points.len() < 3 {
        return;
    }
    for i in 1..points.len() - 1 {
        out.push(Vertex::at(points[0], color));
        out.push(Vertex::at(points[i], color));
        out.push(Vertex::at(points[i + 1], color));
    }
}

/// Generate vertices for a thick line segment
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    push_quad(
        out,
        [from + perp, to + perp, to - perp, from - perp],
        [color; 4],
    );
}

/// Generate vertices for bitmap text
pub fn text(out: &mut Vec<Vertex>, s: &str, pos: Vec2, size: f32, color: [f32; 4], align: Align) {
    let cell = font::cell_size(size);
    for corner in font::lit_cells(s, pos, size, align) {
        rect(out, &Rect::new(corner.x, corner.y, cell, cell), color);
    }
}

fn bounds_rect(b: [f32; 4]) -> Rect {
    Rect::new(b[0], b[1], b[2], b[3])
}

fn sprite_part(out: &mut Vec<Vertex>, part: &SpritePart) {
    match part {
        SpritePart::Ellipse { bounds, color } => {
            let r = bounds_rect(*bounds);
            ellipse(out, r.center(), Vec2::new(r.w, r.h) / 2.0, linear_color(*color));
        }
        SpritePart::EllipseOutline {
            bounds,
            width,
            color,
        } => {
            let r = bounds_rect(*bounds);
            ellipse_ring(out, r.center(), Vec2::new(r.w, r.h) / 2.0, *width, linear_color(*color));
        }
        SpritePart::Circle {
            center,
            radius,
            color,
        } => circle(out, *center, *radius, linear_color(*color)),
        SpritePart::Polygon { points, color } => polygon(out, points, linear_color(*color)),
        SpritePart::Rect { bounds, color } => rect(out, &bounds_rect(*bounds), linear_color(*color)),
    }
}

/// Generate vertices for a sprite centered on `center`, rotated clockwise on screen
pub fn sprite(out: &mut Vec<Vertex>, sprite: &Sprite, center: Vec2, rotation_deg: f32) {
    let start = out.len();
    for part in &sprite.parts {
        sprite_part(out, part);
    }

    let half = sprite.size / 2.0;
    let rot = Vec2::from_angle(rotation_deg.to_radians());
    for v in &mut out[start..] {
        let local = v.pos() - half;
        let p = center + rot.rotate(local);
        v.position = [p.x, p.y];
    }
}

/// Tessellate a whole frame in painter's order
pub fn tessellate(list: &DrawList, sprites: &SpriteSheet, out: &mut Vec<Vertex>) {
    for cmd in list {
        match cmd {
            DrawCmd::Rect { rect: r, color } => rect(out, r, linear_color(*color)),
            DrawCmd::GradientRect { rect: r, top, bottom } => {
                gradient_rect(out, r, linear_color(*top), linear_color(*bottom))
            }
            DrawCmd::Circle {
                center,
                radius,
                color,
            } => circle(out, *center, *radius, linear_color(*color)),
            DrawCmd::Ellipse { rect: r, color } => {
                ellipse(out, r.center(), Vec2::new(r.w, r.h) / 2.0, linear_color(*color))
            }
            DrawCmd::EllipseOutline {
                rect: r,
                width,
                color,
            } => ellipse_ring(out, r.center(), Vec2::new(r.w, r.h) / 2.0, *width, linear_color(*color)),
            DrawCmd::Polygon { points, color } => polygon(out, points, linear_color(*color)),
            DrawCmd::Line {
                from,
                to,
                width,
                color,
            } => line(out, *from, *to, *width, linear_color(*color)),
            DrawCmd::Sprite {
                name,
                center,
                rotation_deg,
            } => match sprites.get(name) {
                Some(s) => sprite(out, s, *center, *rotation_deg),
                None => log::debug!("No sprite named '{name}'"),
            },
            DrawCmd::Text {
                text: s,
                pos,
                size,
                color,
                align,
            } => text(out, s, *pos, *size, linear_color(*color), *align),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::draw::rgb;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_rect_is_two_triangles() {
        let mut out = Vec::new();
        rect(&mut out, &Rect::new(10.0, 20.0, 30.0, 40.0), WHITE);
        assert_eq!(out.len(), 6);
        let min = out.iter().fold(Vec2::splat(f32::MAX), |m, v| m.min(v.pos()));
        let max = out.iter().fold(Vec2::splat(f32::MIN), |m, v| m.max(v.pos()));
        assert_eq!(min, Vec2::new(10.0, 20.0));
        assert_eq!(max, Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_empty_rect_emits_nothing() {
        let mut out = Vec::new();
        rect(&mut out, &Rect::new(0.0, 0.0, 0.0, 10.0), WHITE);
        assert!(out.is_empty());
    }

    #[test]
    fn test_gradient_colors_top_and_bottom() {
        let mut out = Vec::new();
        let top = [1.0, 0.0, 0.0, 1.0];
        let bottom = [0.0, 0.0, 1.0, 1.0];
        gradient_rect(&mut out, &Rect::new(0.0, 0.0, 10.0, 10.0), top, bottom);
        for v in &out {
            let expected = if v.position[1] == 0.0 { top } else { bottom };
            assert_eq!(v.color, expected);
        }
    }

    #[test]
    fn test_circle_stays_within_radius() {
        let mut out = Vec::new();
        let center = Vec2::new(100.0, 100.0);
        circle(&mut out, center, 10.0, WHITE);
        assert_eq!(out.len() % 3, 0);
        for v in &out {
            assert!(v.pos().distance(center) <= 10.0 + 1e-3);
        }
    }

    #[test]
    fn test_polygon_fan() {
        let mut out = Vec::new();
        let tri = [Vec2::ZERO, Vec2::X, Vec2::Y];
        polygon(&mut out, &tri, WHITE);
        assert_eq!(out.len(), 3);
        polygon(&mut out, &tri[..2], WHITE);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_line_has_requested_width() {
        let mut out = Vec::new();
        line(&mut out, Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0), 4.0, WHITE);
        let xs: Vec<f32> = out.iter().map(|v| v.position[0]).collect();
        let spread = xs.iter().cloned().fold(f32::MIN, f32::max) - xs.iter().cloned().fold(f32::MAX, f32::min);
        assert!((spread - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_sprite_centered_on_target() {
        let sheet = SpriteSheet::builtin();
        let bird = sheet.get(crate::assets::BIRD).unwrap();
        let mut out = Vec::new();
        let center = Vec2::new(266.0, 300.0);
        sprite(&mut out, bird, center, 0.0);
        for v in &out {
            let d = v.pos() - center;
            assert!(d.x.abs() <= 25.0 + 1e-3 && d.y.abs() <= 17.5 + 1e-3);
        }
    }

    #[test]
    fn test_sprite_rotation_turns_clockwise() {
        let sprite_def = Sprite {
            size: Vec2::new(10.0, 10.0),
            parts: vec![SpritePart::Rect {
                bounds: [9.0, 4.0, 1.0, 2.0],
                color: [255; 4],
            }],
        };
        let mut out = Vec::new();
        sprite(&mut out, &sprite_def, Vec2::ZERO, 90.0);
        // A point on the right edge ends up below the center (y grows downward)
        let avg = out.iter().map(|v| v.pos()).sum::<Vec2>() / out.len() as f32;
        assert!(avg.y > 3.0 && avg.x.abs() < 1.0);
    }

    #[test]
    fn test_tessellate_text_and_shapes() {
        let mut list = DrawList::new();
        list.rect(Rect::new(0.0, 0.0, 5.0, 5.0), rgb(1, 2, 3));
        list.text("-", Vec2::ZERO, 7.0, rgb(255, 255, 255), Align::Left);
        let mut out = Vec::new();
        tessellate(&list, &SpriteSheet::builtin(), &mut out);
        // One rect plus five lit cells
        assert_eq!(out.len(), 6 * 6);
    }
}
