//! Voxel grid regression test
//!
//! Memory layout, format conversion, shared ownership and serialization
//! of voxel grids, plus volumes built on them.
//!
//! Run with:
//! ```
//! cargo test -p volflow-core --test grid_reg
//! ```

use glam::{IVec3, UVec3, Vec3};
use volflow_core::{Error, PhantomBuilder, Volume, VoxelFormat, VoxelGrid};
use volflow_test::{RegParams, regout_dir};

#[test]
fn grid_reg_layout() {
    let mut rp = RegParams::new("grid_layout");

    let dims = UVec3::new(5, 4, 3);
    let grid = VoxelGrid::from_fn(dims, VoxelFormat::UInt16, |p| {
        (p.x + 10 * p.y + 100 * p.z) as f32
    })
    .unwrap();

    // x varies fastest
    let pos = IVec3::new(3, 2, 1);
    let index = grid.linear_index(pos).unwrap();
    rp.compare_values((3 + 2 * 5 + 5 * 4) as f64, index as f64, 0.0);
    rp.compare_values(1.0, if grid.position(index) == pos { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(123.0, f64::from(grid.voxel(pos).unwrap()), 0.0);
    rp.compare_values(123.0 / 65535.0, f64::from(grid.voxel_normalized(pos).unwrap()), 1e-9);

    // Out-of-grid positions
    for outside in [IVec3::new(-1, 0, 0), IVec3::new(5, 0, 0), IVec3::new(0, 0, 3)] {
        rp.compare_values(1.0, if grid.voxel(outside).is_none() { 1.0 } else { 0.0 }, 0.0);
        rp.compare_values(1.0, if grid.linear_index(outside).is_none() { 1.0 } else { 0.0 }, 0.0);
    }

    let mut m = grid.to_mut();
    match m.set_voxel(IVec3::new(0, 4, 0), 1.0) {
        Err(Error::PositionOutOfBounds { x: 0, y: 4, z: 0 }) => {}
        other => panic!("expected out-of-bounds error, got {other:?}"),
    }

    assert!(rp.cleanup(), "grid layout test failed");
}

#[test]
fn grid_reg_formats() {
    let mut rp = RegParams::new("grid_formats");

    let mut m = VoxelGrid::new(UVec3::splat(2), VoxelFormat::UInt8).unwrap().to_mut();
    m.set_voxel(IVec3::new(0, 0, 0), 300.0).unwrap();
    m.set_voxel(IVec3::new(1, 0, 0), -5.0).unwrap();
    m.set_voxel(IVec3::new(0, 1, 0), 2.6).unwrap();
    m.set_voxel_normalized(IVec3::new(1, 1, 0), 0.5).unwrap();
    let grid: VoxelGrid = m.into();

    rp.compare_values(255.0, f64::from(grid.voxel(IVec3::new(0, 0, 0)).unwrap()), 0.0);
    rp.compare_values(0.0, f64::from(grid.voxel(IVec3::new(1, 0, 0)).unwrap()), 0.0);
    rp.compare_values(3.0, f64::from(grid.voxel(IVec3::new(0, 1, 0)).unwrap()), 0.0);
    rp.compare_values(128.0, f64::from(grid.voxel(IVec3::new(1, 1, 0)).unwrap()), 0.0);
    rp.compare_values(3.0, grid.count_nonzero() as f64, 0.0);

    let mut f = VoxelGrid::new(UVec3::splat(2), VoxelFormat::Float32).unwrap().to_mut();
    f.set_voxel_normalized(IVec3::ZERO, 1.75).unwrap();
    rp.compare_values(1.75, f64::from(f.voxel_normalized(IVec3::ZERO).unwrap()), 0.0);

    for name in ["uint8", "uint16", "float"] {
        let format = VoxelFormat::from_name(name).unwrap();
        rp.compare_strings(name.as_bytes(), format.name().as_bytes());
    }
    rp.compare_values(1.0, if VoxelFormat::from_name("double").is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(
        VoxelGrid::from_u8(UVec3::splat(2), vec![0; 7]).is_err(),
        "length mismatch must be rejected"
    );
    assert!(matches!(
        VoxelGrid::new(UVec3::new(4, 0, 4), VoxelFormat::UInt8),
        Err(Error::InvalidDimension { .. })
    ));

    assert!(rp.cleanup(), "grid format test failed");
}

#[test]
fn grid_reg_ownership() {
    let mut rp = RegParams::new("grid_ownership");

    let grid = VoxelGrid::new(UVec3::splat(3), VoxelFormat::UInt8).unwrap();
    let shared = grid.clone();
    rp.compare_values(2.0, grid.ref_count() as f64, 0.0);

    // Shared data cannot be mutated in place
    let grid = match grid.try_into_mut() {
        Ok(_) => panic!("shared grid must not convert to mutable"),
        Err(grid) => grid,
    };
    let mut copy = grid.to_mut();
    for index in 0..copy.num_voxels() {
        copy.set_voxel_at(index, 9.0);
    }
    let copy: VoxelGrid = copy.into();
    rp.compare_values(0.0, shared.count_nonzero() as f64, 0.0);
    rp.compare_values(27.0, copy.count_nonzero() as f64, 0.0);

    drop(shared);
    let mut sole = grid.try_into_mut().unwrap();
    sole.set_voxel(IVec3::ONE, 1.0).unwrap();
    let sole: VoxelGrid = sole.into();
    rp.compare_values(1.0, sole.count_nonzero() as f64, 0.0);

    let deep = sole.deep_clone();
    rp.compare_values(1.0, deep.ref_count() as f64, 0.0);
    rp.compare_grids(&sole, &deep);

    assert!(rp.cleanup(), "grid ownership test failed");
}

#[test]
fn grid_reg_serialization() {
    let mut rp = RegParams::new("grid_serial");

    let grid = PhantomBuilder::new(UVec3::new(9, 7, 5), VoxelFormat::Float32)
        .with_background(0.25)
        .with_sphere(Vec3::new(4.0, 3.0, 2.0), 2.0, 0.75)
        .with_noise(0.01, 5)
        .build()
        .unwrap();

    let path = format!("{}/grid_serial.vgrid", regout_dir());
    grid.write_to_file(&path).unwrap();
    let read = VoxelGrid::read_from_file(&path).unwrap();
    rp.compare_grids(&grid, &read);
    rp.compare_values(1.0, if read.format() == VoxelFormat::Float32 { 1.0 } else { 0.0 }, 0.0);

    let bytes = grid.write_to_bytes().unwrap();
    let header = String::from_utf8_lossy(&bytes[..40]);
    rp.compare_values(1.0, if header.contains("VoxelGrid Version 1") { 1.0 } else { 0.0 }, 0.0);

    // Truncated data is rejected
    let truncated = &bytes[..bytes.len() - 20];
    assert!(matches!(
        VoxelGrid::read_from_bytes(truncated),
        Err(Error::DecodeError(_))
    ));
    assert!(VoxelGrid::read_from_bytes(b"not a grid").is_err());

    assert!(rp.cleanup(), "grid serialization test failed");
}

#[test]
fn grid_reg_volume() {
    let mut rp = RegParams::new("grid_volume");

    let grid = VoxelGrid::new(UVec3::new(10, 20, 5), VoxelFormat::UInt16).unwrap();
    let volume = Volume::from_grid(grid.clone())
        .with_spacing(Vec3::new(0.5, 0.5, 3.0))
        .unwrap();
    rp.compare_values(1.0, if volume.format() == VoxelFormat::UInt16 { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(15.0, f64::from(volume.extent().z), 0.0);
    rp.compare_grids(&grid, volume.require_ram().unwrap());

    // Cloning a volume shares its grid
    let copy = volume.clone();
    rp.compare_values(3.0, grid.ref_count() as f64, 0.0);
    drop(copy);

    let bare = Volume::without_representation(UVec3::splat(4), VoxelFormat::UInt8).unwrap();
    assert!(matches!(bare.require_ram(), Err(Error::NoRepresentation)));
    assert!(Volume::without_representation(UVec3::new(4, 4, 0), VoxelFormat::UInt8).is_err());

    assert!(rp.cleanup(), "grid volume test failed");
}
