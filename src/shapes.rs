use std::f32::consts::FRAC_PI_2;

use bevy::asset::RenderAssetUsages;
use bevy::color::palettes::css;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

pub struct ShapesPlugin;

impl Plugin for ShapesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_shape_assets);
    }
}

pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
pub const PLAYER_STROKE: f32 = 3.0;
pub const WANDERER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
/// Half of the 15 px arc width the wanderer's corners are drawn with
pub const WANDERER_CORNER_RADIUS: f32 = 7.5;
pub const SEEKER_RADIUS: f32 = 20.0;
pub const BULLET_SIZE: Vec2 = Vec2::new(20.0, 1.0);
pub const SHOCKWAVE_RADIUS: f32 = 75.0;
pub const SHOCKWAVE_STROKE: f32 = 2.0;

/// Mesh and material handles for every primitive shape, created once.
///
/// `Default` holds placeholder handles, which is enough to spawn entities
/// in an app without a renderer.
#[derive(Resource, Default)]
pub struct ShapeAssets {
    pub player_mesh: Handle<Mesh>,
    pub player_material: Handle<ColorMaterial>,
    pub wanderer_mesh: Handle<Mesh>,
    pub wanderer_material: Handle<ColorMaterial>,
    pub seeker_mesh: Handle<Mesh>,
    pub seeker_material: Handle<ColorMaterial>,
    pub bullet_mesh: Handle<Mesh>,
    pub bullet_material: Handle<ColorMaterial>,
    pub shockwave_mesh: Handle<Mesh>,
    pub shockwave_material: Handle<ColorMaterial>,
}

/// The player's arrowhead, pointing along +x and centred on its bounding box.
pub fn player_outline() -> [Vec2; 3] {
    let half = PLAYER_SIZE / 2.0;
    [
        Vec2::new(-half.x, half.y),
        Vec2::new(half.x, 0.0),
        Vec2::new(-half.x, -half.y),
    ]
}

pub fn load_shape_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.insert_resource(ShapeAssets {
        player_mesh: meshes.add(polygon_stroke(&player_outline(), PLAYER_STROKE)),
        player_material: materials.add(Color::from(css::BLUE)),
        wanderer_mesh: meshes.add(rounded_rect(WANDERER_SIZE, WANDERER_CORNER_RADIUS, 6)),
        wanderer_material: materials.add(Color::from(css::GREEN_YELLOW)),
        seeker_mesh: meshes.add(Circle::new(SEEKER_RADIUS)),
        seeker_material: materials.add(Color::from(css::DARK_RED)),
        bullet_mesh: meshes.add(Rectangle::from_size(BULLET_SIZE)),
        bullet_material: materials.add(Color::from(css::RED)),
        shockwave_mesh: meshes.add(Annulus::new(
            SHOCKWAVE_RADIUS - SHOCKWAVE_STROKE / 2.0,
            SHOCKWAVE_RADIUS + SHOCKWAVE_STROKE / 2.0,
        )),
        shockwave_material: materials.add(Color::from(css::BLUE_VIOLET)),
    });
}

/// Vertices of a closed stroke around `points`, two per corner.
///
/// Corner `i` produces `2 * i` on one side of the outline and `2 * i + 1` on
/// the other, both offset along the mitred corner normal so the stroke keeps
/// the same `width` along every edge.
pub fn stroke_vertices(points: &[Vec2], width: f32) -> Vec<Vec2> {
    let n = points.len();
    let half_width = width / 2.0;
    let mut vertices = Vec::with_capacity(n * 2);

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let here = points[i];
        let next = points[(i + 1) % n];

        let normal_in = edge_normal(prev, here);
        let normal_out = edge_normal(here, next);
        let miter = (normal_in + normal_out).normalize_or_zero();
        let offset = if miter == Vec2::ZERO {
            normal_out * half_width
        } else {
            miter * (half_width / miter.dot(normal_out))
        };

        vertices.push(here + offset);
        vertices.push(here - offset);
    }

    vertices
}

fn edge_normal(from: Vec2, to: Vec2) -> Vec2 {
    let d = to - from;
    Vec2::new(d.y, -d.x).normalize_or_zero()
}

fn stroke_indices(corners: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(corners * 6);
    for i in 0..corners {
        let j = (i + 1) % corners;
        let (a_out, a_in) = (2 * i as u32, 2 * i as u32 + 1);
        let (b_out, b_in) = (2 * j as u32, 2 * j as u32 + 1);
        indices.extend_from_slice(&[a_out, a_in, b_out, a_in, b_in, b_out]);
    }
    indices
}

/// A hollow polygon with a stroke of `width`.
pub fn polygon_stroke(points: &[Vec2], width: f32) -> Mesh {
    let vertices = stroke_vertices(points, width);
    flat_mesh(&vertices, stroke_indices(points.len()))
}

/// Points around a rectangle of `size` with corners rounded to `radius`,
/// `segments + 1` points per corner, counter-clockwise from the right edge.
pub fn rounded_rect_outline(size: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    let half = size / 2.0;
    let radius = radius.clamp(0.0, half.x.min(half.y));
    let inner = half - Vec2::splat(radius);
    let corners = [
        Vec2::new(inner.x, inner.y),
        Vec2::new(-inner.x, inner.y),
        Vec2::new(-inner.x, -inner.y),
        Vec2::new(inner.x, -inner.y),
    ];
    let segments = segments.max(1);

    let mut outline = Vec::with_capacity(4 * (segments + 1));
    for (quadrant, center) in corners.iter().enumerate() {
        let start = quadrant as f32 * FRAC_PI_2;
        for step in 0..=segments {
            let angle = start + FRAC_PI_2 * step as f32 / segments as f32;
            outline.push(*center + Vec2::from_angle(angle) * radius);
        }
    }
    outline
}

/// A filled rounded rectangle, triangulated as a fan around its centre.
pub fn rounded_rect(size: Vec2, radius: f32, segments: usize) -> Mesh {
    let outline = rounded_rect_outline(size, radius, segments);
    let mut vertices = Vec::with_capacity(outline.len() + 1);
    vertices.push(Vec2::ZERO);
    vertices.extend(outline.iter().copied());

    let rim = outline.len() as u32;
    let mut indices = Vec::with_capacity(outline.len() * 3);
    for i in 0..rim {
        indices.extend_from_slice(&[0, 1 + i, 1 + (i + 1) % rim]);
    }

    flat_mesh(&vertices, indices)
}

fn flat_mesh(vertices: &[Vec2], indices: Vec<u32>) -> Mesh {
    let min = vertices.iter().copied().fold(Vec2::MAX, Vec2::min);
    let max = vertices.iter().copied().fold(Vec2::MIN, Vec2::max);
    let extent = (max - min).max(Vec2::splat(f32::EPSILON));

    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| [v.x, v.y, 0.0]).collect();
    let normals = vec![[0.0, 0.0, 1.0]; vertices.len()];
    let uvs: Vec<[f32; 2]> = vertices
        .iter()
        .map(|v| {
            let uv = (*v - min) / extent;
            [uv.x, 1.0 - uv.y]
        })
        .collect();

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn square_stroke_straddles_the_outline() {
        let square = [
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ];

        let vertices = stroke_vertices(&square, 2.0);

        assert_eq!(vertices.len(), 8);
        assert!(close(vertices[0], Vec2::new(-6.0, -6.0)));
        assert!(close(vertices[1], Vec2::new(-4.0, -4.0)));
        assert!(close(vertices[4], Vec2::new(6.0, 6.0)));
        assert!(close(vertices[5], Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn stroke_indices_close_the_loop() {
        let indices = stroke_indices(3);
        assert_eq!(indices.len(), 18);
        assert!(indices.iter().all(|&i| i < 6));
        // Last quad joins corner 2 back to corner 0.
        assert_eq!(&indices[12..], &[4, 5, 0, 5, 1, 0]);
    }

    #[test]
    fn player_outline_points_along_x() {
        let outline = player_outline();
        let tip = outline
            .iter()
            .copied()
            .max_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap();
        assert_eq!(tip, Vec2::new(20.0, 0.0));
        let center: Vec2 = outline.iter().copied().sum::<Vec2>() / 3.0;
        assert!(center.y.abs() < 1e-6);
    }

    #[test]
    fn rounded_rect_stays_within_its_box() {
        let outline = rounded_rect_outline(WANDERER_SIZE, WANDERER_CORNER_RADIUS, 6);

        assert_eq!(outline.len(), 4 * 7);
        for point in &outline {
            assert!(point.x.abs() <= 20.0 + 1e-4);
            assert!(point.y.abs() <= 20.0 + 1e-4);
        }
        // Corners are cut: the outline never reaches (20, 20).
        let corner = Vec2::new(20.0, 20.0);
        assert!(outline.iter().all(|p| p.distance(corner) > 1.0));
        // Edge midpoints are reached at the arc start.
        assert!(close(outline[0], Vec2::new(20.0, 12.5)));
    }

    #[test]
    fn oversized_radius_is_clamped() {
        let outline = rounded_rect_outline(Vec2::new(10.0, 4.0), 50.0, 4);
        assert!(outline.iter().all(|p| p.x.abs() <= 5.0 + 1e-4 && p.y.abs() <= 2.0 + 1e-4));
    }
}
