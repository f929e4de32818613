use std::io::BufReader;

use super::{ModelFormat, ModelLoader};
use crate::error::{Result, ViewerError};
use crate::model::Mesh;

/// Loads Wavefront OBJ text. Companion MTL libraries are never opened; every
/// mesh is shaded with the default material.
pub struct FaceSetLoader;

impl ModelLoader for FaceSetLoader {
    fn format(&self) -> ModelFormat {
        ModelFormat::FaceSet
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Mesh>> {
        let mut reader = BufReader::new(bytes);
        let (models, _materials) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
            |_mtl_path| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|e| ViewerError::parse(ModelFormat::FaceSet, e.to_string()))?;

        log::debug!("OBJ contains {} objects", models.len());

        models
            .into_iter()
            .filter(|m| !m.mesh.indices.is_empty())
            .map(convert_model)
            .collect()
    }
}

fn convert_model(model: tobj::Model) -> Result<Mesh> {
    let mesh = model.mesh;
    let name = model.name;

    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let normals = (!mesh.normals.is_empty()).then(|| {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect::<Vec<_>>()
    });

    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(ViewerError::parse(
            ModelFormat::FaceSet,
            format!("face references vertex {} of {}", bad + 1, positions.len()),
        ));
    }

    let name = (!name.is_empty()).then_some(name);
    Ok(Mesh::from_attributes(name, positions, normals, mesh.indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn quad_is_triangulated() {
        let meshes = FaceSetLoader.parse(QUAD.as_bytes()).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].triangle_count(), 2);
        assert_eq!(meshes[0].name.as_deref(), Some("quad"));
        assert!(meshes[0].material.is_none());
    }

    #[test]
    fn missing_mtl_library_is_not_fatal() {
        let src = format!("mtllib missing.mtl\nusemtl red\n{}", QUAD);
        let meshes = FaceSetLoader.parse(src.as_bytes()).unwrap();
        assert_eq!(meshes[0].triangle_count(), 2);
    }

    #[test]
    fn malformed_vertex_is_a_parse_error() {
        let err = FaceSetLoader.parse(b"v 0 zero 0\nf 1 1 1\n").unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Parse {
                format: ModelFormat::FaceSet,
                ..
            }
        ));
    }
}
