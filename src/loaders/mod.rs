pub mod gltf;
pub mod obj;

use std::fmt;
use std::path::Path;

use crate::error::{Result, ViewerError};
use crate::model::{Mesh, Model};

pub use self::gltf::SceneGraphLoader;
pub use self::obj::FaceSetLoader;

/// File families the viewer can open
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// glTF JSON or binary GLB
    SceneGraph,
    /// Wavefront OBJ
    FaceSet,
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::SceneGraph => f.write_str("glTF"),
            ModelFormat::FaceSet => f.write_str("OBJ"),
        }
    }
}

const GLB_MAGIC: &[u8; 4] = b"glTF";

impl ModelFormat {
    /// Map a lowercase file extension to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "gltf" | "glb" => Some(ModelFormat::SceneGraph),
            "obj" => Some(ModelFormat::FaceSet),
            _ => None,
        }
    }

    /// Guess the format from leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(GLB_MAGIC) {
            return Some(ModelFormat::SceneGraph);
        }

        let head = &bytes[..bytes.len().min(512)];
        let text = String::from_utf8_lossy(head);
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') {
            return Some(ModelFormat::SceneGraph);
        }

        let looks_like_obj = trimmed.lines().any(|line| {
            matches!(
                line.split_whitespace().next(),
                Some("v" | "vn" | "vt" | "f" | "o" | "g" | "mtllib")
            )
        });
        looks_like_obj.then_some(ModelFormat::FaceSet)
    }

    /// Pick a format for `name`. The extension decides when present; content
    /// is only sniffed for names without one.
    pub fn detect(name: &str, bytes: &[u8]) -> Result<Self> {
        let unsupported = || ViewerError::UnsupportedFormat {
            name: name.to_string(),
        };

        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_extension(ext).ok_or_else(unsupported),
            None => Self::sniff(bytes).ok_or_else(unsupported),
        }
    }

    /// Extension-only check used before any bytes are read
    pub fn for_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn loader(&self) -> &'static dyn ModelLoader {
        match self {
            ModelFormat::SceneGraph => &SceneGraphLoader,
            ModelFormat::FaceSet => &FaceSetLoader,
        }
    }
}

/// Turns raw file bytes into meshes
pub trait ModelLoader: Sync {
    fn format(&self) -> ModelFormat;

    /// Parse `bytes` into meshes with vertex data in model space
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Mesh>>;
}

/// Parse an upload into a renderable model. Never touches the scene.
pub fn load_from_bytes(name: &str, bytes: &[u8], format: ModelFormat) -> Result<Model> {
    let loader = format.loader();
    let meshes = loader.parse(bytes)?;

    let mut model = Model::uploaded(name, meshes);
    if model.triangle_count() == 0 {
        return Err(ViewerError::parse(format, "file contains no triangles"));
    }
    model.assign_default_materials();

    log::info!(
        "Parsed {} ({}): {} meshes, {} vertices, {} triangles",
        name,
        format,
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );

    Ok(model)
}

/// Read and parse a model file from disk
pub fn load_file(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = std::fs::read(path).map_err(|source| ViewerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    let format = ModelFormat::detect(&name, &bytes)?;
    load_from_bytes(&name, &bytes, format)
}
