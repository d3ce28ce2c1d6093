use bevy::prelude::*;
use bevy::render::mesh::{PrimitiveTopology, VertexAttributeValues};
use bevy::render::render_asset::RenderAssetUsages;

/// Creates a mesh drawing `positions` with the given topology. The mesh
/// stays in the main world so effects can rewrite it each update.
pub fn create_buffer_mesh(topology: PrimitiveTopology, positions: &[[f32; 3]]) -> Mesh {
    let mut mesh = Mesh::new(topology, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions.to_vec());
    mesh
}

/// Copies `positions` into an existing mesh, reusing its allocation when
/// the length matches.
pub fn write_positions(mesh: &mut Mesh, positions: &[[f32; 3]]) {
    if let Some(VertexAttributeValues::Float32x3(existing)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        if existing.len() == positions.len() {
            existing.copy_from_slice(positions);
            return;
        }
    }
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions.to_vec());
}

/// Uploads `positions` to the mesh behind `handle` if it still exists.
pub fn upload(meshes: &mut Assets<Mesh>, handle: &Handle<Mesh>, positions: &[[f32; 3]]) {
    if let Some(mesh) = meshes.get_mut(handle) {
        write_positions(mesh, positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_positions_replaces_contents() {
        let mut mesh = create_buffer_mesh(PrimitiveTopology::PointList, &[[0.0; 3]; 2]);
        write_positions(&mut mesh, &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        assert_eq!(positions, &vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }
}
