/// Geometry primitives: facets, triangle soup meshes and bounds
use nalgebra::{Point3, Vector3};

/// One triangular face: a single normal shared by three corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Facet {
    pub fn new(normal: Vector3<f32>, vertices: [Point3<f32>; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Normal implied by the counter-clockwise winding of the vertices
    pub fn winding_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }

    pub fn centroid(&self) -> Point3<f32> {
        let [v0, v1, v2] = self.vertices;
        Point3::from((v0.coords + v1.coords + v2.coords) / 3.0)
    }
}

/// Axis-aligned bounds of a set of positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    pub fn largest_dimension(&self) -> f32 {
        self.size().max()
    }
}

/// Triangle soup ready for upload as vertex attribute and element buffers.
///
/// Every facet contributes three fresh positions, its normal replicated three
/// times and one index triple `(n, n + 1, n + 2)`. Positions are never shared
/// between facets, so `indices.len() * 3 == positions.len() == normals.len()`
/// always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(facets: usize) -> Self {
        Self {
            positions: Vec::with_capacity(facets * 3),
            normals: Vec::with_capacity(facets * 3),
            indices: Vec::with_capacity(facets),
        }
    }

    pub fn from_facets<I>(facets: I) -> Self
    where
        I: IntoIterator<Item = Facet>,
    {
        let facets = facets.into_iter();
        let mut mesh = Self::with_capacity(facets.size_hint().0);
        for facet in facets {
            mesh.push_facet(&facet);
        }
        mesh
    }

    pub fn push_facet(&mut self, facet: &Facet) {
        let n = self.positions.len() as u32;
        self.indices.push([n, n + 1, n + 2]);
        self.positions.extend_from_slice(&facet.vertices);
        self.normals.extend(std::iter::repeat(facet.normal).take(3));
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// An empty mesh has nothing to draw; callers skip it before touching the GPU.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn facet_count(&self) -> usize {
        self.indices.len()
    }

    /// Reassemble the facets in load order
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.indices.iter().map(move |&[a, b, c]| {
            Facet::new(
                self.normals[a as usize],
                [
                    self.positions[a as usize],
                    self.positions[b as usize],
                    self.positions[c as usize],
                ],
            )
        })
    }

    /// Positions flattened with a stride of three floats
    pub fn position_data(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }

    /// Normals flattened with a stride of three floats
    pub fn normal_data(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect()
    }

    /// Element indices flattened, three per facet
    pub fn index_data(&self) -> Vec<u32> {
        self.indices.iter().flatten().copied().collect()
    }

    pub fn positions_size_bytes(&self) -> usize {
        self.positions.len() * 3 * std::mem::size_of::<f32>()
    }

    pub fn normals_size_bytes(&self) -> usize {
        self.normals.len() * 3 * std::mem::size_of::<f32>()
    }

    pub fn indices_size_bytes(&self) -> usize {
        self.indices.len() * 3 * std::mem::size_of::<u32>()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.positions.first()?;
        let bounds = self.positions.iter().fold(
            BoundingBox {
                min: first,
                max: first,
            },
            |acc, p| BoundingBox {
                min: acc.min.inf(p),
                max: acc.max.sup(p),
            },
        );
        Some(bounds)
    }

    /// Shift every position by `offset`; normals are unaffected
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for position in &mut self.positions {
            *position += offset;
        }
    }

    /// Axis-aligned cube centred on the origin, two facets per side
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = Point3::new;
        let sides = [
            // front
            (Vector3::z(), [p(-h, -h, h), p(h, -h, h), p(h, h, h), p(-h, h, h)]),
            // back
            (-Vector3::z(), [p(h, -h, -h), p(-h, -h, -h), p(-h, h, -h), p(h, h, -h)]),
            // top
            (Vector3::y(), [p(-h, h, h), p(h, h, h), p(h, h, -h), p(-h, h, -h)]),
            // bottom
            (-Vector3::y(), [p(-h, -h, -h), p(h, -h, -h), p(h, -h, h), p(-h, -h, h)]),
            // right
            (Vector3::x(), [p(h, -h, h), p(h, -h, -h), p(h, h, -h), p(h, h, h)]),
            // left
            (-Vector3::x(), [p(-h, -h, -h), p(-h, -h, h), p(-h, h, h), p(-h, h, -h)]),
        ];

        let mut mesh = Self::with_capacity(sides.len() * 2);
        for (normal, [a, b, c, d]) in sides {
            mesh.push_facet(&Facet::new(normal, [a, b, c]));
            mesh.push_facet(&Facet::new(normal, [a, c, d]));
        }
        mesh
    }
}
