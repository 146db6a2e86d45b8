// Best record survives across sessions.

use glam::IVec3;
use tetris3d::core::{load_best, save_best, GameProgress, GameState, StepResult};
use tetris3d::HostConfig;

#[test]
fn best_record_carries_over_to_the_next_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tetris3d.dat");

    let mut first = GameState::new(IVec3::new(4, 10, 4), 1);
    first.set_best(load_best(&path));
    assert_eq!(first.best(), GameProgress::default());

    // Rest the piece on the floor and fill the rest of the bottom layer.
    let shape = *first.piece().shape();
    let min_y = shape.iter().map(|v| v.y).min().unwrap();
    let pos = IVec3::new(2, -min_y, 2);
    first.piece_mut().set_position(pos);
    for z in 0..4 {
        for x in 0..4 {
            if !shape.iter().any(|&v| pos + v == IVec3::new(x, 0, z)) {
                first.grid_mut().set(x, 0, z, 1);
            }
        }
    }
    assert_eq!(first.step_down(), StepResult::Locked(1));
    save_best(&path, first.best_including_current()).unwrap();

    let mut second = GameState::new(IVec3::new(4, 10, 4), 2);
    second.set_best(load_best(&path));
    assert_eq!(second.best().score, 16);
    assert_eq!(second.best().pieces_locked, 1);
}

#[test]
fn config_points_at_a_custom_save_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.dat");
    let path_str = path.to_string_lossy().into_owned();
    let cfg = HostConfig::from_lookup(|key| (key == "TETRIS3D_SAVE_PATH").then(|| path_str.clone()));
    assert_eq!(cfg.save_path, path);

    let best = GameProgress {
        score: 48,
        pieces_locked: 9,
    };
    save_best(&cfg.save_path, best).unwrap();
    assert_eq!(load_best(&cfg.save_path), best);
}
