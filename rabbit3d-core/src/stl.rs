/// ASCII STL parser producing GPU-ready triangle soups
///
/// Parsing is line oriented and forgiving: a malformed facet is dropped as a
/// whole and the scan continues with the next one. Binary STL is not
/// recognised; its bytes never match a keyword and produce an empty mesh.
use std::path::Path;

use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use nom::{
    character::complete::{multispace0, multispace1},
    error::ErrorKind,
    number::complete::float,
    IResult,
};

use crate::error::Error;
use crate::geometry::{Facet, Mesh};

const BEGIN_SOLID: &str = "solid ";
const BEGIN_FACET: &str = "facet normal ";
const BEGIN_LOOP: &str = "outer loop";
const VERTEX: &str = "vertex ";
const END_LOOP: &str = "endloop";

/// Parsed contents of an STL document before flattening into a [`Mesh`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StlDocument {
    pub name: String,
    pub facets: Vec<Facet>,
    /// Facets that were opened but never committed
    pub discarded: usize,
}

impl StlDocument {
    pub fn into_mesh(self) -> Mesh {
        Mesh::from_facets(self.facets)
    }
}

/// Facet under construction
#[derive(Debug, Clone, Copy)]
struct OpenFacet {
    normal: Vector3<f32>,
    vertices: [Point3<f32>; 3],
    /// Number of `vertex` lines seen inside the loop, including excess ones
    seen: usize,
}

impl OpenFacet {
    fn new(normal: Vector3<f32>) -> Self {
        Self {
            normal,
            vertices: [Point3::origin(); 3],
            seen: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    InFacet(OpenFacet),
    InLoop(OpenFacet),
}

struct Parser {
    state: State,
    document: StlDocument,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: State::Idle,
            document: StlDocument::default(),
        }
    }

    /// Drop whatever facet is open and go back to scanning
    fn abandon(&mut self) {
        if !matches!(self.state, State::Idle) {
            self.document.discarded += 1;
        }
        self.state = State::Idle;
    }

    fn line(&mut self, line: &str) {
        if let Some(name) = line.strip_prefix(BEGIN_SOLID) {
            self.document.name = name.trim().to_string();
            return;
        }

        if let Some(rest) = line.strip_prefix(BEGIN_FACET) {
            self.abandon();
            match parse_vector3(rest) {
                Ok((_, (x, y, z))) => {
                    self.state = State::InFacet(OpenFacet::new(Vector3::new(x, y, z)));
                }
                Err(_) => self.document.discarded += 1,
            }
            return;
        }

        if line.starts_with(BEGIN_LOOP) {
            if let State::InFacet(facet) = self.state {
                self.state = State::InLoop(facet);
            }
            return;
        }

        if let Some(rest) = line.strip_prefix(VERTEX) {
            let State::InLoop(mut facet) = self.state else {
                return;
            };

            // Index guard: a fourth corner is never written
            if facet.seen < 3 {
                match parse_vector3(rest) {
                    Ok((_, (x, y, z))) => facet.vertices[facet.seen] = Point3::new(x, y, z),
                    Err(_) => {
                        self.abandon();
                        return;
                    }
                }
            }
            facet.seen += 1;
            self.state = State::InLoop(facet);
            return;
        }

        if line.starts_with(END_LOOP) {
            if let State::InLoop(facet) = self.state {
                if facet.seen == 3 {
                    self.document
                        .facets
                        .push(Facet::new(facet.normal, facet.vertices));
                    self.state = State::Idle;
                } else {
                    self.abandon();
                }
            }
            return;
        }

        // `endfacet`, `endsolid` and anything unrecognised carry no state;
        // the open facet was already resolved at `endloop`.
    }

    fn finish(mut self) -> StlDocument {
        self.abandon();
        self.document
    }
}

/// Parse an ASCII STL document into its name and committed facets
pub fn parse_ascii_stl_document(input: &str) -> StlDocument {
    let mut parser = Parser::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        parser.line(line);
    }

    let document = parser.finish();
    debug!(
        "parsed STL solid '{}': {} facets kept, {} discarded",
        document.name,
        document.facets.len(),
        document.discarded
    );
    document
}

/// Parse an ASCII STL document into a mesh; no valid facets gives an empty mesh
pub fn parse_ascii_stl(input: &str) -> Mesh {
    parse_ascii_stl_document(input).into_mesh()
}

/// Read and parse an STL file into its document, reporting I/O failures
pub fn read_stl_document(path: impl AsRef<Path>) -> Result<StlDocument, Error> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8_lossy(&data);
    let document = parse_ascii_stl_document(&text);
    if document.discarded > 0 {
        warn!(
            "{}: discarded {} malformed facets",
            path.display(),
            document.discarded
        );
    }
    Ok(document)
}

/// Read and parse an STL file, reporting I/O failures
pub fn read_stl(path: impl AsRef<Path>) -> Result<Mesh, Error> {
    let path = path.as_ref();
    let mesh = read_stl_document(path)?.into_mesh();
    info!("{}: loaded {} facets", path.display(), mesh.facet_count());
    Ok(mesh)
}

/// Load an STL file; a missing or unreadable file is an empty mesh, not an error
pub fn load_stl(path: impl AsRef<Path>) -> Mesh {
    match read_stl(path) {
        Ok(mesh) => mesh,
        Err(e) => {
            warn!("{e}; continuing with an empty mesh");
            Mesh::new()
        }
    }
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;

    // `float` also accepts nan and inf spellings
    if ![x, y, z].iter().all(|c| c.is_finite()) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Float,
        )));
    }
    Ok((input, (x, y, z)))
}
