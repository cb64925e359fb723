//! Integration tests for cldview-scene
//!
//! These tests write capture files to disk and drive the public API end to end:
//! reading, building, dataset augmentation, playback and camera positioning.

use approx::assert_relative_eq;
use cldview_core::{Point3f, Vector3f};
use cldview_scene::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write `content` to a temporary capture file
fn capture_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Camera, Person1 and Person2 tracked for 10 samples, one per second from 0 to 9.
/// Person1 walks along +X at 1 unit per second.
fn three_body_mocap() -> String {
    let mut content = String::from(
        "Time,Camera/x,Camera/y,Camera/z,Camera/qx,Camera/qy,Camera/qz,Camera/qw,\
         Person1/x,Person1/y,Person1/z,Person2/x,Person2/y,Person2/z,Person2/rx,Person2/ry,Person2/rz\n",
    );
    for i in 0..10 {
        content.push_str(&format!(
            "{}.0,0,1.5,8,0,0,0,1,{},1.7,0,-2,1.6,1,0,{},0\n",
            i,
            i,
            i * 10
        ));
    }
    content
}

#[test]
fn test_build_three_body_scene() {
    let file = capture_file(&three_body_mocap());
    let scene = build_scene(file.path()).unwrap();

    assert_eq!(scene.nodes_with_role(NodeRole::Camera).count(), 1);
    assert_eq!(scene.camera().unwrap().name(), "Camera");
    assert_eq!(person_nodes(&scene).len(), 2);
    assert_eq!(scene.start_time(), 0.0);
    assert_eq!(scene.finish_time(), 9.0);
    assert_eq!(scene.current_time(), 0.0);

    for node in person_nodes(&scene) {
        assert_eq!(node.timeline().map(|t| t.len()), Some(10));
    }
    assert!(scene.find(ARROW_NODE).is_some());
    assert!(scene.find(AXES_NODE).is_some());
}

#[test]
fn test_person_nodes_exclude_camera_and_markers() {
    let file = capture_file(&three_body_mocap());
    let scene = build_scene(file.path()).unwrap();

    let names: Vec<&str> = person_nodes(&scene).iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["Person1", "Person2"]);
}

#[test]
fn test_time_range_spans_bodies_with_dropouts() {
    let content = "\
time\tA x\tA y\tA z\tB x\tB y\tB z
0.5\tNaN\tNaN\tNaN\t0\t0\t0
1.0\t1\t1\t1\t0\t0\t0
2.0\t2\t2\t2\t\t\t
4.5\t3\t3\t3\t\t\t
";
    let file = capture_file(content);
    let scene = build_scene(file.path()).unwrap();

    assert_eq!(scene.time_range(), (0.5, 4.5));
    assert_eq!(scene.find("A").unwrap().timeline().unwrap().start_time(), Some(1.0));
    assert_eq!(scene.find("B").unwrap().timeline().unwrap().finish_time(), Some(1.0));
    assert!(scene.camera().is_none());
}

#[test]
fn test_empty_files_are_empty_data() {
    for content in ["", "Time,Person1/x,Person1/y,Person1/z\n"] {
        let file = capture_file(content);
        assert!(matches!(build_scene(file.path()), Err(Error::EmptyData(_))));
    }
}

#[test]
fn test_malformed_files_are_parse_errors() {
    let bad_number = capture_file("Time,A/x,A/y,A/z\n0,1,2,abc\n");
    assert!(matches!(
        build_scene(bad_number.path()),
        Err(Error::Parse { line: Some(2), .. })
    ));

    let bad_count = capture_file("Time,A/x,A/y,A/z\n0,1,2,3\n1,1,2\n");
    assert!(matches!(
        build_scene(bad_count.path()),
        Err(Error::Parse { line: Some(3), .. })
    ));

    assert!(matches!(
        build_scene("no/such/mocap.csv"),
        Err(Error::Parse { line: None, .. })
    ));
}

#[test]
fn test_playback_interpolates_persons() {
    let file = capture_file(&three_body_mocap());
    let mut scene = build_scene(file.path()).unwrap();

    assert_eq!(scene.set_time(4.25), 4.25);
    let person = scene.find("Person1").unwrap();
    assert_relative_eq!(person.transform().translation.x, 4.25, epsilon = 1e-5);

    assert_eq!(scene.set_time(-3.0), 0.0);
    let person = scene.find("Person1").unwrap();
    assert_relative_eq!(person.transform().translation.x, 0.0, epsilon = 1e-5);
}

#[test]
fn test_position_blob_round_trip() {
    let file = capture_file(&three_body_mocap());
    let mut scene = build_scene(file.path()).unwrap();
    apply_standard_position(&mut scene, "Overhead").unwrap();

    let camera = scene.camera().unwrap();
    let saved = *camera.transform();
    let blob = position_data(camera).unwrap();
    assert_eq!(blob.len(), POSITION_DATA_LEN);

    let camera = scene.camera_mut().unwrap();
    camera.set_transform(Default::default());
    set_position(camera, &blob).unwrap();
    assert_relative_eq!(camera.transform().translation, saved.translation, epsilon = 1e-6);
    assert_relative_eq!(camera.transform().rotation, saved.rotation, epsilon = 1e-6);
    assert_eq!(camera.timeline().map(|t| t.len()), Some(10));
}

#[test]
fn test_corrupt_blob_leaves_camera_unchanged() {
    let file = capture_file(&three_body_mocap());
    let mut scene = build_scene(file.path()).unwrap();
    let camera = scene.camera_mut().unwrap();
    let before = *camera.transform();
    let blob = position_data(camera).unwrap();

    let oversized = [blob.clone(), vec![0; 4]].concat();
    let bad_blobs: [&[u8]; 2] = [&blob[..20], &oversized];
    for bad in bad_blobs {
        assert!(matches!(set_position(camera, bad), Err(Error::CorruptData(_))));
        assert_eq!(camera.transform(), &before);
    }
}

#[test]
fn test_position_data_only_for_camera() {
    let file = capture_file(&three_body_mocap());
    let mut scene = build_scene(file.path()).unwrap();
    let blob = position_data(scene.camera().unwrap()).unwrap();

    let person = scene.find_mut("Person1").unwrap();
    assert!(matches!(position_data(person), Err(Error::Unsupported(_))));
    assert!(matches!(set_position(person, &blob), Err(Error::Unsupported(_))));
}

#[test]
fn test_dataset_attaches_measures() {
    let mocap = capture_file(&three_body_mocap());
    let mut scene = build_scene(mocap.path()).unwrap();

    let dataset = capture_file("Time,Person1/laughter,Person2/laughter,Ghost/laughter\n0,0,1,1\n5,1,0,1\n");
    let report = add_dataset(&mut scene, dataset.path()).unwrap();

    assert_eq!(report.matched, vec!["Person1".to_string(), "Person2".to_string()]);
    assert_eq!(report.skipped, vec!["Ghost".to_string()]);
    let laughter = scene.find("Person1").unwrap().annotation("laughter").unwrap();
    assert_eq!(laughter.value_at(6.0), Some(1.0));
}

#[test]
fn test_dataset_without_overlap_leaves_scene_unchanged() {
    let mocap = capture_file(&three_body_mocap());
    let mut scene = build_scene(mocap.path()).unwrap();
    let timelines: Vec<_> = scene.iter().map(|n| n.timeline().cloned()).collect();

    let dataset = capture_file("Time,Stranger/gaze\n0,1\n");
    assert!(matches!(
        add_dataset(&mut scene, dataset.path()),
        Err(Error::Dataset(_))
    ));

    let after: Vec<_> = scene.iter().map(|n| n.timeline().cloned()).collect();
    assert_eq!(timelines, after);
    assert!(scene.iter().all(|n| n.annotations().next().is_none()));
    assert_eq!(scene.time_range(), (0.0, 9.0));
}

#[test]
fn test_malformed_dataset_is_parse_error() {
    let mocap = capture_file(&three_body_mocap());
    let mut scene = build_scene(mocap.path()).unwrap();

    let dataset = capture_file("Time,Person1/laughter\n0,1\n0,2\n");
    assert!(matches!(
        add_dataset(&mut scene, dataset.path()),
        Err(Error::Parse { .. })
    ));
    assert!(scene.find("Person1").unwrap().annotation("laughter").is_none());
}

#[test]
fn test_builder_options() {
    let content = "time rig:x rig:y rig:z P:x P:y P:z\n0 1000 0 0 0 2000 0\n";
    let file = capture_file(content);
    let options = SceneBuilderOptions::default()
        .with_camera_body("RIG")
        .with_unit_scale(0.001)
        .without_markers();
    let scene = SceneBuilder::new(options).build_scene(file.path()).unwrap();

    assert_eq!(scene.len(), 2);
    let camera = scene.camera().unwrap();
    assert_eq!(camera.name(), "rig");
    assert_relative_eq!(camera.transform().translation, Vector3f::new(1.0, 0.0, 0.0), epsilon = 1e-6);
}

#[test]
fn test_points_of_view() {
    let file = capture_file(&three_body_mocap());
    let mut scene = build_scene(file.path()).unwrap();

    let person = person_nodes(&scene)[0].id();
    let pov = pov_with_person(&scene, person).unwrap();
    assert_relative_eq!(pov.transform.position(), Point3f::new(0.0, 1.7, 0.0), epsilon = 1e-6);

    let overhead = pov_ortho(&scene);
    apply_pov(&mut scene, &overhead).unwrap();
    assert_eq!(scene.camera().unwrap().transform(), &overhead.transform);

    let camera = scene.camera_id().unwrap();
    assert!(matches!(pov_with_person(&scene, camera), Err(Error::InvalidData(_))));
}
