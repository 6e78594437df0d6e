use sonarmap_hal::{MockPanServo, MockRangeSensor, NO_ECHO, ScriptedRangeSensor};
use sonarmap_mapping::{
    CellState, GridPoint, MapperConfig, MappingContext, MappingError, OccupancyGrid, Pose, ScanSample,
};
use tempfile::tempdir;

fn fast_config() -> MapperConfig {
    MapperConfig {
        settle_delay_ms: 0,
        ..Default::default()
    }
}

#[test]
fn test_full_scan_at_constant_range() {
    let mut ctx = MappingContext::new(fast_config()).unwrap();
    let mut ranging = ScriptedRangeSensor::new(vec![40.0; 13]);
    let mut pan = MockPanServo::new();

    let summary = ctx.scan(&mut ranging, &mut pan).unwrap();

    assert_eq!(summary.raw_samples, 13);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.mapped_samples, 37);
    assert_eq!(summary.stats.rasterized, 37);
    assert_eq!(summary.stats.out_of_bounds, 0);
    assert!(summary.new_obstacles() > 0);
    assert_eq!(ctx.grid().counts().occupied, summary.new_obstacles());
    assert_eq!(ctx.last_scan().len(), 13);
    assert_eq!(pan.angle(), 0);

    // straight ahead, to the left and to the right of the robot
    assert_eq!(ctx.grid().get(GridPoint::new(90, 50)), CellState::Occupied);
    assert_eq!(ctx.grid().get(GridPoint::new(50, 90)), CellState::Occupied);
    assert_eq!(ctx.grid().get(GridPoint::new(50, 10)), CellState::Occupied);
    assert_eq!(ctx.grid().get(GridPoint::new(70, 50)), CellState::Free);
    // behind the robot is never observed
    assert_eq!(ctx.grid().get(GridPoint::new(20, 50)), CellState::Unknown);
}

#[test]
fn test_readings_in_drop_zone_leave_grid_untouched() {
    let mut ctx = MappingContext::new(fast_config()).unwrap();
    let mut ranging = ScriptedRangeSensor::new(vec![85.0; 13]);
    let mut pan = MockPanServo::new();

    let summary = ctx.scan(&mut ranging, &mut pan).unwrap();

    assert_eq!(summary.raw_samples, 13);
    assert_eq!(summary.new_obstacles(), 0);
    assert_eq!(summary.stats.beyond_threshold, 37);
    assert_eq!(ctx.grid().counts().unknown, 10_000);
}

#[test]
fn test_invalid_readings_never_reach_the_grid() {
    let mut ctx = MappingContext::new(fast_config()).unwrap();
    let mut ranging = ScriptedRangeSensor::new(vec![NO_ECHO; 13]);
    let mut pan = MockPanServo::new();

    let summary = ctx.scan(&mut ranging, &mut pan).unwrap();

    assert_eq!(summary.raw_samples, 0);
    assert_eq!(summary.rejected, 13);
    assert_eq!(summary.mapped_samples, 0);
    assert!(ctx.last_scan().is_empty());
    assert_eq!(ctx.grid().counts().unknown, 10_000);
}

#[test]
fn test_scan_without_interpolation() {
    let config = MapperConfig {
        interpolate: false,
        ..fast_config()
    };
    let mut ctx = MappingContext::new(config).unwrap();
    let mut ranging = ScriptedRangeSensor::new(vec![30.0; 13]);
    let mut pan = MockPanServo::new();

    let summary = ctx.scan(&mut ranging, &mut pan).unwrap();
    assert_eq!(summary.mapped_samples, 13);
    assert_eq!(summary.stats.rasterized, 13);
}

#[test]
fn test_move_and_rescan_only_adds_knowledge() {
    let mut ctx = MappingContext::new(fast_config()).unwrap();
    let mut ranging = MockRangeSensor::with_seed(35.0, 3, 7);
    let mut pan = MockPanServo::new();

    ctx.scan(&mut ranging, &mut pan).unwrap();
    let before = ctx.grid().snapshot();

    ctx.advance(10.0, 90.0).unwrap();
    assert_eq!(ctx.pose(), Pose::new(50, 60, 90.0));
    ctx.scan(&mut ranging, &mut pan).unwrap();

    for (old, new) in before.cells().iter().zip(ctx.grid().cells()) {
        match old {
            CellState::Occupied => assert_eq!(*new, CellState::Occupied),
            CellState::Free => assert_ne!(*new, CellState::Unknown),
            CellState::Unknown => {}
        }
    }
    assert!(ctx.grid().counts().unknown < before.counts().unknown);
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("room.smap");

    let mut ctx = MappingContext::new(fast_config()).unwrap();
    let mut ranging = MockRangeSensor::with_seed(45.0, 3, 11);
    let mut pan = MockPanServo::new();
    ctx.scan(&mut ranging, &mut pan).unwrap();
    ctx.save_map(&path).unwrap();

    let mut restored = MappingContext::new(fast_config()).unwrap();
    let counts = restored.load_map(&path).unwrap();
    assert_eq!(restored.grid(), ctx.grid());
    assert_eq!(counts, ctx.grid().counts());

    assert_eq!(OccupancyGrid::load(&path).unwrap(), *ctx.grid());
}

#[test]
fn test_load_rejects_wrong_size_and_keeps_grid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.smap");
    OccupancyGrid::new(20).unwrap().save(&path).unwrap();

    let mut ctx = MappingContext::new(fast_config()).unwrap();
    ctx.integrate(&[ScanSample::new(0, 10.0)]);
    let before = ctx.grid().snapshot();

    let err = ctx.load_map(&path).unwrap_err();
    assert!(matches!(
        err,
        MappingError::DimensionMismatch {
            expected: 100,
            found: 20
        }
    ));
    assert_eq!(*ctx.grid(), before);
}

#[test]
fn test_load_failures() {
    let dir = tempdir().unwrap();
    let mut ctx = MappingContext::new(fast_config()).unwrap();

    let missing = dir.path().join("missing.smap");
    assert!(matches!(ctx.load_map(&missing), Err(MappingError::Io(_))));

    let garbage = dir.path().join("garbage.smap");
    std::fs::write(&garbage, b"not a map at all").unwrap();
    assert!(matches!(ctx.load_map(&garbage), Err(MappingError::Corrupt(_))));

    let oversized = dir.path().join("oversized.smap");
    let mut header = b"SMAP".to_vec();
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    std::fs::write(&oversized, header).unwrap();
    assert!(matches!(ctx.load_map(&oversized), Err(MappingError::Corrupt(_))));

    assert_eq!(ctx.grid().counts().unknown, 10_000);
}
