use dae2buf::DaeError;
use dae2buf::collada::{
    Influence, ParseOptions, ReferenceMatching, Semantic, parse_slice, parse_str,
};
use dae2buf::math::IDENTITY_MATRIX;
use nalgebra::{Matrix4, Point3};

const TRIANGLE: &str = include_str!("fixtures/triangle.dae");
const CUBE: &str = include_str!("fixtures/cube.dae");
const ANIMATED_CUBE: &str = include_str!("fixtures/animated_cube.dae");
const SKINNED_CYLINDER: &str = include_str!("fixtures/skinned_cylinder.dae");

fn parse(text: &str) -> dae2buf::collada::Document {
    parse_str(text, ParseOptions::default()).expect("fixture parses")
}

// ─── Geometry ─────────────────────────────────────────────────────────────────

#[test]
fn given_triangle_document_when_reading_positions_then_vertices_come_back_in_order() {
    let document = parse(TRIANGLE);

    assert_eq!(document.version, "1.4.1");
    let geometry = document.geometry("Triangle-mesh").expect("geometry");
    assert_eq!(geometry.name.as_deref(), Some("Triangle"));

    let mesh = geometry.mesh.as_ref().expect("mesh");
    let source = mesh.sources.get("Triangle-mesh-positions").expect("positions");
    assert_eq!(source.float_data().len(), 9);
    assert_eq!(source.stride(), 3);
    assert_eq!(mesh.triangle_count(), 1);

    let positions = mesh.positions().expect("triangulated positions");
    assert_eq!(
        positions.data,
        vec![0.0, 1.0, 0.0, -1.0, -1.0, 0.0, 1.0, -1.0, 0.0]
    );
}

#[test]
fn given_cube_document_when_interleaving_then_216_floats_of_position_and_normal() {
    let document = parse(CUBE);
    let mesh = document.geometries[0].mesh.as_ref().expect("mesh");

    let buffer = mesh.interleaved().expect("interleaved");

    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(buffer.layout.width(), 6);
    assert_eq!(buffer.data.len(), 216);
    assert!(!buffer.is_truncated());
    assert_eq!(&buffer.data[0..6], &[-1.0, -1.0, -1.0, 0.0, 0.0, -1.0]);

    let positions = mesh.positions().expect("positions");
    assert_eq!(positions.data.len(), 3 * 3 * 12);
    assert!(mesh.tex_coords().is_none());
    assert_eq!(mesh.primitives[0].material.as_deref(), Some("Material-material"));
}

#[test]
fn given_cube_document_when_reading_scene_then_materials_and_nodes_resolve() {
    let document = parse(CUBE);

    let material = document.material("Material-material").expect("material");
    assert_eq!(material.name.as_deref(), Some("Material"));
    assert_eq!(material.effect_ref.as_deref(), Some("Material-effect"));

    let scene = document.scene().expect("scene");
    assert_eq!(scene.id, "Scene");
    assert_eq!(scene.nodes.len(), 1);
    let cube = &scene.nodes[0];
    assert_eq!(cube.geometry_ref.as_deref(), Some("Cube-mesh"));
    assert_eq!(cube.material_refs, vec!["Material-material".to_string()]);
    assert_eq!(cube.transform, IDENTITY_MATRIX);
    assert!(cube.children.is_empty());
}

#[test]
fn given_texcoord_input_when_interleaving_then_uv_follows_position() {
    let document = parse(SKINNED_CYLINDER);
    let mesh = document.geometry("Cylinder-mesh").and_then(|g| g.mesh.as_ref()).expect("mesh");

    let buffer = mesh.interleaved().expect("interleaved");

    assert_eq!(buffer.layout.normal, None);
    assert_eq!(buffer.layout.tex_coord, Some(2));
    assert_eq!(buffer.data.len(), 2 * 3 * 5);
    assert_eq!(&buffer.data[5..10], &[1.0, 0.0, 0.0, 1.0, 0.0]);
}

// ─── Skinning ─────────────────────────────────────────────────────────────────

#[test]
fn given_skinned_document_when_resolving_then_influences_follow_vcount() {
    let document = parse(SKINNED_CYLINDER);
    let controller = document.controller("#Cylinder-skin").expect("controller");
    let skin = controller.skin.as_ref().expect("skin");

    assert_eq!(skin.source_geometry_id(), "Cylinder-mesh");
    assert_eq!(skin.joint_names(), ["Bone1", "Bone2", "Bone3"]);
    assert_eq!(skin.vertex_count(), 4);
    assert_eq!(skin.max_joint_influences(), 2);

    let counts: Vec<usize> = skin.vertex_influences().iter().map(<[Influence]>::len).collect();
    assert_eq!(counts, vec![1, 2, 2, 2]);
    assert_eq!(
        skin.influences(0).expect("vertex 0"),
        &[Influence { joint: 0, weight: 1.0 }]
    );
    assert_eq!(
        skin.influences(1).expect("vertex 1"),
        &[
            Influence { joint: 0, weight: 0.5 },
            Influence { joint: 1, weight: 0.5 }
        ]
    );
    assert_eq!(skin.influences(3).expect("vertex 3")[0].weight, 0.6);

    let mesh = document.skinned_mesh(controller).expect("skinned mesh");
    assert_eq!(mesh.sources.get("positions").map(|s| s.record_count()), Some(4));
}

#[test]
fn given_skinned_document_when_reading_matrices_then_one_block_per_joint() {
    let document = parse(SKINNED_CYLINDER);
    let skin = document.controllers[0].skin.as_ref().expect("skin");

    assert_eq!(skin.inverse_bind_matrices().len(), 16 * skin.joint_count());
    assert_eq!(skin.joint_inverse_bind_matrix(0).map(|m| m[7]), Some(-1.0));
    assert_eq!(skin.joint_inverse_bind_matrix(1).map(|m| m[7]), Some(-2.0));
    assert!(skin.joint_inverse_bind_matrix(3).is_none());
    assert_eq!(skin.bind_shape_matrix4(), Matrix4::identity());

    let inverse = skin.inverse_bind_matrix4(2).expect("Bone3");
    let moved = inverse.transform_point(&Point3::new(0.0, 3.0, 0.0));
    assert!(moved.coords.norm() < 0.0001);
}

#[test]
fn given_skinned_scene_when_walking_joints_then_skeleton_root_and_world_transforms_match() {
    let document = parse(SKINNED_CYLINDER);
    let scene = document.scene().expect("scene");

    let cylinder = scene.find_node("Cylinder").expect("cylinder node");
    assert_eq!(cylinder.controller_ref.as_deref(), Some("Cylinder-skin"));
    assert_eq!(cylinder.skeleton_root_refs, vec!["Armature_Bone1".to_string()]);

    let root = scene.skeleton_root(cylinder).expect("skeleton root");
    assert!(root.is_joint());
    let names: Vec<_> = root.joints().filter_map(|joint| joint.name.as_deref()).collect();
    assert_eq!(names, ["Bone1", "Bone2", "Bone3"]);
    assert_eq!(scene.joint_count(), 3);

    let skin = document.controllers[0].skin.as_ref().expect("skin");
    for (joint, world) in root.world_transforms(&Matrix4::identity()) {
        let name = joint.name.as_deref().expect("joint name");
        let index = skin.joint_index(name).expect("joint in skin");
        let inverse = skin.inverse_bind_matrix4(index).expect("inverse bind");
        let product = world * inverse;
        assert!((product - Matrix4::identity()).norm() < 0.0001, "{name}");
    }
}

// ─── Animation ────────────────────────────────────────────────────────────────

#[test]
fn given_animated_document_when_reading_then_sampler_and_channel_resolve() {
    let document = parse(ANIMATED_CUBE);

    assert_eq!(document.animations.len(), 1);
    let animation = &document.animations[0];
    assert_eq!(animation.id.as_deref(), Some("Cube_location_X"));
    assert_eq!(animation.sources.len(), 3);

    let sampler = &animation.samplers[0];
    assert_eq!(sampler.id, "Cube_location_X-sampler");
    assert!(sampler.input(&Semantic::Input).is_some());
    assert!(sampler.input(&Semantic::Output).is_some());

    let channel = &animation.channels[0];
    assert_eq!(channel.source, "Cube_location_X-sampler");
    assert_eq!(channel.target_node(), "Cube");

    let data = animation.sampler_data(&channel.source).expect("sampler data");
    assert_eq!(data.input, &[0.0, 1.0, 2.0]);
    assert_eq!(data.output, &[0.0, 2.5, 0.0]);
    let interpolation = sampler.input(&Semantic::Interpolation).expect("interpolation");
    assert_eq!(
        animation.sources.as_string_slice(interpolation).map(<[String]>::len),
        Some(3)
    );
}

#[test]
fn given_translate_rotate_scale_when_composing_then_document_order_is_applied() {
    let document = parse(ANIMATED_CUBE);
    let cube = document.scene().and_then(|scene| scene.find_node("Cube")).expect("cube");

    let moved = cube.transform_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));

    assert!((moved.x - 0.0).abs() < 0.0001);
    assert!((moved.y - 2.0).abs() < 0.0001);
}

#[test]
fn given_animations_disabled_when_parsing_then_library_is_skipped() {
    let options = ParseOptions {
        read_animations: false,
        read_scene: false,
        ..ParseOptions::default()
    };

    let document = parse_str(ANIMATED_CUBE, options).expect("document");

    assert!(document.animations.is_empty());
    assert!(document.scene().is_none());
    assert_eq!(document.geometries.len(), 1);
}

// ─── Summary ──────────────────────────────────────────────────────────────────

#[test]
fn given_skinned_document_when_summarizing_then_report_serializes() {
    let document = parse_slice(SKINNED_CYLINDER.as_bytes(), ParseOptions::default()).expect("doc");

    let summary = document.summary();

    assert_eq!(summary.geometries[0].float_count, 30);
    assert_eq!(summary.skins[0].joint_count, 3);
    assert_eq!(summary.skins[0].max_joint_influences, 2);
    assert_eq!(summary.material_count, 1);
    assert_eq!(summary.root_node_count, 2);
    assert_eq!(summary.joint_count, 3);

    let json = serde_json::to_value(&summary).expect("json");
    assert_eq!(json["skins"][0]["source_geometry"], "Cylinder-mesh");
    assert_eq!(json["skins"][0]["truncated"], false);
}

// ─── Edge cases ───────────────────────────────────────────────────────────────

const PREFIXED_REFERENCE: &str = r##"<COLLADA version="1.4.1">
  <library_geometries>
    <geometry id="Mesh">
      <mesh>
        <source id="Mesh-positions">
          <float_array count="9">0 1 0 -1 -1 0 1 -1 0</float_array>
        </source>
        <vertices id="Mesh-vertices">
          <input semantic="POSITION" source="#positions"/>
        </vertices>
        <triangles>
          <input semantic="VERTEX" source="#Mesh-vertices"/>
          <p>0 1 2</p>
        </triangles>
        <polylist count="1"><vcount>4</vcount><p>0 1 2 0</p></polylist>
      </mesh>
    </geometry>
  </library_geometries>
</COLLADA>"##;

#[test]
fn given_short_reference_when_matching_then_only_lenient_lookup_resolves_it() {
    let lenient = parse_str(PREFIXED_REFERENCE, ParseOptions::default()).expect("lenient");
    let mesh = lenient.geometries[0].mesh.as_ref().expect("mesh");

    // Missing count falls back to the index stream length; default stride is 3.
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.positions().map(|p| p.data.len()), Some(9));
    assert_eq!(mesh.skipped_primitives, 1);

    let options = ParseOptions {
        reference_matching: ReferenceMatching::Exact,
        ..ParseOptions::default()
    };
    let exact = parse_str(PREFIXED_REFERENCE, options).expect("exact");
    assert!(exact.geometries[0].mesh.as_ref().expect("mesh").positions().is_none());
}

#[test]
fn given_malformed_float_when_parsing_then_whole_document_fails() {
    let text = PREFIXED_REFERENCE.replace("-1 -1 0", "-1 oops 0");

    let error = parse_str(&text, ParseOptions::default()).expect_err("malformed float");

    assert!(matches!(error, DaeError::InvalidFloat { ref token, .. } if token == "oops"));
}

#[test]
fn given_negative_vcount_when_parsing_then_whole_document_fails() {
    let text = SKINNED_CYLINDER.replace("<vcount>1 2 2 2</vcount>", "<vcount>1 -2 2 2</vcount>");

    let error = parse_str(&text, ParseOptions::default()).expect_err("negative vcount");

    assert!(matches!(error, DaeError::NegativeCount { value: -2, .. }));
}

#[test]
fn given_short_bind_shape_matrix_when_parsing_then_identity_is_kept() {
    let text = SKINNED_CYLINDER.replace(
        "<bind_shape_matrix>1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1</bind_shape_matrix>",
        "<bind_shape_matrix>2 0 0</bind_shape_matrix>",
    );

    let document = parse_str(&text, ParseOptions::default()).expect("document");
    let skin = document.controllers[0].skin.as_ref().expect("skin");

    assert_eq!(skin.bind_shape_matrix(), &IDENTITY_MATRIX);
}

#[test]
fn given_huge_triangle_count_when_parsing_then_buffer_is_bounded_and_flagged() {
    let text = TRIANGLE.replace(r#"<triangles count="1">"#, r#"<triangles count="2147483647">"#);

    let document = parse_str(&text, ParseOptions::default()).expect("document");
    let mesh = document.geometries[0].mesh.as_ref().expect("mesh");
    let positions = mesh.positions().expect("positions");

    assert_eq!(positions.data.len(), 9);
    assert_eq!(positions.expected_len, 3 * 3 * i32::MAX as usize);
    assert!(positions.is_truncated());
    assert!(document.summary().geometries[0].truncated);
}

#[test]
fn given_count_or_offset_outside_i32_when_parsing_then_attribute_error_is_returned() {
    let count = TRIANGLE.replace(r#"<triangles count="1">"#, r#"<triangles count="4294967296">"#);
    let offset = TRIANGLE.replace(r#"offset="0""#, r#"offset="-1""#);

    assert!(matches!(
        parse_str(&count, ParseOptions::default()),
        Err(DaeError::InvalidAttribute { ref attribute, .. }) if attribute == "count"
    ));
    assert!(matches!(
        parse_str(&offset, ParseOptions::default()),
        Err(DaeError::InvalidAttribute { ref attribute, ref value, .. })
            if attribute == "offset" && value == "-1"
    ));
}

#[test]
fn given_vcount_larger_than_v_stream_when_parsing_then_skin_is_flagged_truncated() {
    let text = SKINNED_CYLINDER.replace(
        "<vcount>1 2 2 2</vcount>",
        "<vcount>2147483647 2 2 2</vcount>",
    );

    let document = parse_str(&text, ParseOptions::default()).expect("document");
    let skin = document.controllers[0].skin.as_ref().expect("skin");

    assert_eq!(skin.vertex_count(), 4);
    assert_eq!(skin.influences(0).map(<[Influence]>::len), Some(7));
    assert!(skin.influences(3).expect("vertex 3").is_empty());
    assert!(skin.is_truncated());
    assert!(document.summary().skins[0].truncated);
}
