//! Mesh module - shared vertex pool plus a list of geometries
//!
//! Every per-frame stage of the software pipeline is a method here:
//! [`Mesh::transform`], [`Mesh::cull`], [`Mesh::light`], [`Mesh::project`],
//! [`Mesh::sort_by_depth`] and [`Mesh::draw`].

use std::collections::HashMap;
use std::ops::Add;

use glam::{IVec3, Mat4, Vec2, Vec3};

use crate::geometry::{Face, Geometry, Polyline, Stroke};
use crate::surface::Surface;
use crate::types::Rgba;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    geometries: Vec<Geometry>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, geometries: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            geometries: Vec::with_capacity(geometries),
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vec3] {
        &mut self.vertices
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Drop all vertices and geometries, keeping capacity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.geometries.clear();
    }

    /// Push a vertex and return its index.
    pub fn push_vertex(&mut self, v: Vec3) -> u32 {
        self.vertices.push(v);
        (self.vertices.len() - 1) as u32
    }

    pub fn push_geometry(&mut self, geometry: Geometry) {
        debug_assert!(
            geometry
                .indices()
                .iter()
                .all(|&id| (id as usize) < self.vertices.len()),
            "geometry index out of range"
        );
        self.geometries.push(geometry);
    }

    /// Merge `a` and `b` into a new mesh: `a`'s vertices, then `b`'s, with
    /// `b`'s indices shifted past `a`.
    pub fn merge(a: &Mesh, b: &Mesh) -> Mesh {
        let mut out = Mesh::with_capacity(
            a.vertices.len() + b.vertices.len(),
            a.geometries.len() + b.geometries.len(),
        );
        out.append(a);
        out.append(b);
        out
    }

    /// In-place merge of `other` onto the end of `self`.
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.geometries.extend(other.geometries.iter().map(|g| {
            let mut g = g.clone();
            g.shift(offset);
            g
        }));
        self.validate();
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    pub fn transform(&mut self, m: &Mat4) {
        for v in &mut self.vertices {
            *v = m.transform_point3(*v);
        }
    }

    /// Remove geometries facing away from a camera at the origin.
    pub fn cull(&mut self) {
        let vertices = &self.vertices;
        self.geometries.retain(|g| !g.is_backfacing(vertices));
    }

    /// Flat-light every face against a unit `direction`.
    pub fn light(&mut self, direction: Vec3) {
        let vertices = &self.vertices;
        for g in &mut self.geometries {
            g.light(vertices, direction);
        }
    }

    /// Perspective-divide x/y by z, flip y, scale and recentre.
    ///
    /// z is kept so geometries can still be depth-sorted afterwards.
    pub fn project(&mut self, scale: f32, centre: Vec2) {
        for v in &mut self.vertices {
            let x = v.x / v.z;
            let y = -(v.y / v.z);
            *v = Vec3::new(x * scale + centre.x, y * scale + centre.y, v.z);
        }
    }

    /// Stable sort, farthest average depth first.
    pub fn sort_by_depth(&mut self) {
        let vertices = &self.vertices;
        self.geometries.sort_by(|a, b| {
            b.average_depth(vertices)
                .total_cmp(&a.average_depth(vertices))
        });
    }

    pub fn set_fill_alpha(&mut self, alpha: f32) {
        for g in &mut self.geometries {
            g.set_fill_alpha(alpha);
        }
    }

    pub fn clear_outlines(&mut self) {
        for g in &mut self.geometries {
            g.clear_outline();
        }
    }

    /// Draw every geometry in list order.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let mut path = Vec::with_capacity(8);
        for g in &self.geometries {
            g.draw(&self.vertices, &mut path, surface);
        }
    }

    /// Check that every index is within the vertex pool.
    #[inline]
    pub fn validate(&self) {
        debug_assert!(
            self.geometries.iter().all(|g| g
                .indices()
                .iter()
                .all(|&id| (id as usize) < self.vertices.len())),
            "mesh index out of range"
        );
    }

    /// True when every index is within the vertex pool.
    pub fn is_valid(&self) -> bool {
        self.geometries.iter().all(|g| {
            g.indices()
                .iter()
                .all(|&id| (id as usize) < self.vertices.len())
        })
    }
}

impl Add<&Mesh> for &Mesh {
    type Output = Mesh;

    fn add(self, rhs: &Mesh) -> Mesh {
        Mesh::merge(self, rhs)
    }
}

impl Add for Mesh {
    type Output = Mesh;

    fn add(mut self, rhs: Mesh) -> Mesh {
        self.append(&rhs);
        self
    }
}

/// Builds meshes on the integer lattice, sharing coincident vertices.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
    lookup: HashMap<IVec3, u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the vertex at `p`, inserting it on first use.
    pub fn vertex(&mut self, p: IVec3) -> u32 {
        if let Some(&id) = self.lookup.get(&p) {
            return id;
        }
        let id = self.mesh.push_vertex(p.as_vec3());
        self.lookup.insert(p, id);
        id
    }

    /// Corner indices of the quad `[p, p+u, p+u+w, p+w]`; its normal is `u × w`.
    pub fn quad(&mut self, p: IVec3, u: IVec3, w: IVec3) -> [u32; 4] {
        [
            self.vertex(p),
            self.vertex(p + u),
            self.vertex(p + u + w),
            self.vertex(p + w),
        ]
    }

    pub fn face(&mut self, p: IVec3, u: IVec3, w: IVec3, fill: Rgba, outline: Option<Stroke>) {
        let ids = self.quad(p, u, w);
        self.mesh
            .push_geometry(Geometry::Face(Face::new(ids.to_vec(), fill, outline)));
    }

    /// Closed outline of the quad `[p, p+u, p+u+w, p+w]`.
    pub fn outline(&mut self, p: IVec3, u: IVec3, w: IVec3, stroke: Stroke) {
        let [a, b, c, d] = self.quad(p, u, w);
        self.mesh
            .push_geometry(Geometry::Polyline(Polyline::new(vec![a, b, c, d, a], stroke)));
    }

    pub fn finish(self) -> Mesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad(fill: u32) -> Mesh {
        let mut b = MeshBuilder::new();
        b.face(IVec3::ZERO, IVec3::X, IVec3::Y, Rgba::hex(fill), None);
        b.finish()
    }

    #[test]
    fn merge_concatenates_and_shifts() {
        let a = unit_quad(0xff0000);
        let b = unit_quad(0x00ff00);
        let m = &a + &b;
        assert_eq!(m.vertices().len(), a.vertices().len() + b.vertices().len());
        assert_eq!(m.geometries().len(), 2);
        assert_eq!(m.geometries()[1].indices(), &[4, 5, 6, 7]);
        assert!(m.is_valid());
    }

    #[test]
    fn merge_deep_copies() {
        let a = unit_quad(0xff0000);
        let mut m = Mesh::merge(&a, &Mesh::new());
        m.set_fill_alpha(0.0);
        let Geometry::Face(face) = &a.geometries()[0] else {
            panic!("expected face");
        };
        assert_eq!(face.fill.a, 255);
    }

    #[test]
    fn builder_shares_corners() {
        let mut b = MeshBuilder::new();
        b.face(IVec3::ZERO, IVec3::X, IVec3::Y, Rgba::hex(0), None);
        b.face(IVec3::X, IVec3::X, IVec3::Y, Rgba::hex(0), None);
        let m = b.finish();
        assert_eq!(m.vertices().len(), 6);
        assert_eq!(m.geometries().len(), 2);
    }

    #[test]
    fn sort_is_back_to_front_and_stable() {
        let mut m = Mesh::new();
        for (i, z) in [2.0, 5.0, 2.0, 9.0].into_iter().enumerate() {
            let base = m.push_vertex(Vec3::new(0.0, 0.0, z));
            m.push_vertex(Vec3::new(1.0, 0.0, z));
            m.push_geometry(Geometry::Polyline(Polyline::new(
                vec![base, base + 1],
                Stroke::new(Rgba::hex(i as u32), 1.0),
            )));
        }
        m.sort_by_depth();
        let order: Vec<u32> = m
            .geometries()
            .iter()
            .map(|g| match g {
                Geometry::Polyline(l) => l.stroke.color.b as u32,
                Geometry::Face(_) => unreachable!(),
            })
            .collect();
        assert_eq!(order, vec![3, 1, 0, 2]);
    }

    #[test]
    fn cull_drops_faces_pointing_at_camera() {
        let mut visible = unit_quad(0);
        visible.translate(Vec3::new(0.0, 0.0, 5.0));
        visible.cull();
        assert_eq!(visible.geometries().len(), 1);

        let mut b = MeshBuilder::new();
        b.face(IVec3::new(0, 0, 5), IVec3::Y, IVec3::X, Rgba::hex(0), None);
        let mut hidden = b.finish();
        hidden.cull();
        assert!(hidden.is_empty());
    }

    #[test]
    fn project_divides_and_flips() {
        let mut m = Mesh::new();
        m.push_vertex(Vec3::new(2.0, 4.0, 2.0));
        m.project(10.0, Vec2::new(100.0, 50.0));
        assert_eq!(m.vertices()[0], Vec3::new(110.0, 30.0, 2.0));
    }
}
